//! Waveshare 2.13" (B) V4 E-Paper Display Driver
//!
//! A driver for the 122x250 black/white/red e-paper panel, controlled over
//! SPI plus the RST, DC and BUSY lines.
//!
//! ## Features
//!
//! - `no_std` compatible
//! - `embedded-hal` v1.0 support
//! - `embedded-graphics` integration (with `graphics` feature)
//! - Explicit controller state machine with out-of-order calls rejected
//! - Busy polling with a configurable timeout
//! - Chip-select framed transport for a shared SPI bus
//! - Rotation support
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use epd2in13b_v4::{Builder, Display, Interface, Rotation};
//!
//! # struct MockSpi;
//! # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiDevice for MockSpi {
//! #     fn transaction(
//! #         &mut self,
//! #         _operations: &mut [Operation<'_, u8>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl InputPin for MockPin {
//! #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let spi = MockSpi;
//! # let dc = MockPin;
//! # let rst = MockPin;
//! # let busy = MockPin;
//! # let mut delay = MockDelay;
//! let interface = Interface::new(spi, dc, rst, busy);
//! let config = match Builder::new().rotation(Rotation::Rotate90).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//!
//! let mut display = Display::new(interface, config);
//! let _ = display.init(&mut delay);
//! let _ = display.clear(0xFF, 0xFF, &mut delay);
//! let _ = display.sleep(&mut delay);
//! ```

#![no_std]

#[cfg(test)]
extern crate alloc;

/// Shared SPI bus transport on `embedded-hal-bus`
pub mod bus;
/// Color types for the black/white/red panel
pub mod color;
/// Controller command definitions
pub mod command;
/// Display configuration types and builder
pub mod config;
/// Core display operations
pub mod display;
/// Error types for the driver
pub mod error;
/// Hardware interface abstraction
pub mod interface;
/// Coordinate rotation utilities
pub mod rotation;

/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

pub use bus::{SharedSpiDevice, TransportError};
pub use color::Color;
pub use config::{
    Builder, Config, DEFAULT_BUSY_TIMEOUT_MS, DeepSleepMode, Dimensions, MAX_GATE_OUTPUTS,
    MAX_SOURCE_OUTPUTS, ResetTiming, Rotation,
};
pub use display::{Display, Plane, State};
pub use error::{BuilderError, Error};
pub use interface::InterfaceError;
pub use interface::{DisplayInterface, Interface};

#[cfg(feature = "graphics")]
pub use graphics::GraphicDisplay;
