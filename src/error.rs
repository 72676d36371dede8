//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`])
//! and display operations ([`Error`]).
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction
//! - [`Error`] - Runtime errors during display operations
//! - [`InterfaceError`](crate::interface::InterfaceError) - Low-level SPI/GPIO errors
//! - [`TransportError`](crate::bus::TransportError) - Shared bus acquisition and framing errors
//!
//! Runtime errors fall into three groups:
//!
//! | Group | Variants |
//! |-------|----------|
//! | Hardware timeout | [`Error::BusyTimeout`] |
//! | Contract violation | [`Error::InvalidState`], [`Error::BufferSizeMismatch`], [`Error::InvalidWindow`], [`Error::InvalidCursor`] |
//! | Transport | [`Error::Interface`] (an unavailable shared bus surfaces here as [`TransportError::BusUnavailable`](crate::bus::TransportError::BusUnavailable)) |
//!
//! ## Example
//!
//! ```
//! use epd2in13b_v4::{Dimensions, BuilderError};
//!
//! // Invalid dimensions
//! let result = Dimensions::new(200, 250); // Too wide
//! assert!(matches!(result, Err(BuilderError::InvalidDimensions { .. })));
//! ```

use crate::config::{MAX_GATE_OUTPUTS, MAX_SOURCE_OUTPUTS};
use crate::display::{Plane, State};
use crate::interface::DisplayInterface;

/// Errors that can occur when interacting with the display
///
/// Generic over the interface type to preserve the specific error type.
#[derive(Debug)]
pub enum Error<I: DisplayInterface> {
    /// Interface error (SPI/GPIO)
    ///
    /// Wraps the underlying hardware error from the [`DisplayInterface`] implementation.
    Interface(I::Error),
    /// BUSY stayed asserted past the configured timeout
    BusyTimeout {
        /// Milliseconds spent polling before giving up
        waited_ms: u32,
    },
    /// Operation issued in a state that does not accept it
    ///
    /// Everything except `init` requires the controller to be configured;
    /// after `sleep` the controller must be initialized again.
    InvalidState {
        /// Name of the rejected operation
        operation: &'static str,
        /// State the driver was in
        state: State,
    },
    /// A plane buffer does not have exactly `dimensions.buffer_size()` bytes
    BufferSizeMismatch {
        /// Plane the buffer was meant for
        plane: Plane,
        /// Required buffer size in bytes
        expected: usize,
        /// Provided buffer size in bytes
        provided: usize,
    },
    /// RAM window is inverted or outside the panel
    InvalidWindow {
        /// First column in pixels
        x_start: u16,
        /// First row
        y_start: u16,
        /// Last column in pixels
        x_end: u16,
        /// Last row
        y_end: u16,
    },
    /// RAM address counter is outside the panel
    InvalidCursor {
        /// RAM X address (byte column)
        x: u16,
        /// Row
        y: u16,
    },
}

impl<I: DisplayInterface> Error<I> {
    /// Whether the controller never released BUSY
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::BusyTimeout { .. })
    }

    /// Whether the caller broke the driver contract (bad state, buffer or coordinates)
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::InvalidState { .. }
                | Self::BufferSizeMismatch { .. }
                | Self::InvalidWindow { .. }
                | Self::InvalidCursor { .. }
        )
    }
}

impl<I: DisplayInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Interface(e) => write!(f, "Interface error: {e:?}"),
            Self::BusyTimeout { waited_ms } => {
                write!(f, "Display still busy after {waited_ms}ms")
            }
            Self::InvalidState { operation, state } => {
                write!(f, "Cannot {operation} while display is {state:?}")
            }
            Self::BufferSizeMismatch {
                plane,
                expected,
                provided,
            } => {
                write!(
                    f,
                    "{plane:?} plane size mismatch: expected {expected} bytes, provided {provided}"
                )
            }
            Self::InvalidWindow {
                x_start,
                y_start,
                x_end,
                y_end,
            } => {
                write!(
                    f,
                    "Invalid RAM window: ({x_start}, {y_start})..=({x_end}, {y_end})"
                )
            }
            Self::InvalidCursor { x, y } => write!(f, "Invalid RAM cursor: x={x}, y={y}"),
        }
    }
}

impl<I: DisplayInterface + core::fmt::Debug> core::error::Error for Error<I> {}

/// Errors that can occur when building configuration
#[derive(Debug)]
pub enum BuilderError {
    /// Invalid dimensions provided
    ///
    /// See [`Dimensions::new()`](crate::config::Dimensions::new) for constraints.
    InvalidDimensions {
        /// Width requested
        width: u16,
        /// Height requested
        height: u16,
    },
    /// A busy timeout was set with a zero poll interval
    InvalidTiming {
        /// Poll interval requested
        busy_poll_interval_ms: u32,
        /// Timeout requested
        busy_timeout_ms: u32,
    },
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => write!(
                f,
                "Invalid dimensions {width}x{height} (max {MAX_SOURCE_OUTPUTS}x{MAX_GATE_OUTPUTS})"
            ),
            Self::InvalidTiming {
                busy_poll_interval_ms,
                busy_timeout_ms,
            } => write!(
                f,
                "Busy timeout {busy_timeout_ms}ms needs a non-zero poll interval (got {busy_poll_interval_ms}ms)"
            ),
        }
    }
}

impl core::error::Error for BuilderError {}
