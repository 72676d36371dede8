//! Controller command definitions
//!
//! This module defines the command bytes understood by the controller on the
//! 2.13" (B) V4 panel. Commands are sent over SPI with the DC pin low, data
//! bytes follow with the DC pin high.
//!
//! ## Command Structure
//!
//! Every byte travels in its own chip-select frame:
//! 1. Set DC low (command mode)
//! 2. Assert CS, send the command byte, deassert CS
//! 3. Set DC high (data mode)
//! 4. For each data byte: assert CS, send the byte, deassert CS
//!
//! ## Example
//!
//! ```rust,no_run
//! use epd2in13b_v4::{command, DisplayInterface, Interface};
//! # use core::convert::Infallible;
//! # use embedded_hal::digital::{InputPin, OutputPin};
//! # use embedded_hal::spi::{Operation, SpiDevice};
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
//! # let mut interface = Interface::new(MockSpi, MockPin, MockPin, MockPin);
//! // Soft reset
//! let _ = interface.send_command(command::SOFT_RESET);
//!
//! // Border waveform
//! let _ = interface.send_command(command::BORDER_WAVEFORM);
//! let _ = interface.send_data(&[0x05]);
//! ```

// System control commands

/// Software reset command (0x12)
///
/// Resets every register to its default value. BUSY stays asserted until done.
pub const SOFT_RESET: u8 = 0x12;

/// Driver output control command (0x01)
///
/// Sets the number of gate outputs (rows) and the scanning direction.
/// Requires 3 bytes: [rows-1 (LSB), rows-1 (MSB), scanning flags]
pub const DRIVER_OUTPUT_CONTROL: u8 = 0x01;

/// Border waveform control command (0x3C)
///
/// Requires 1 byte of data.
pub const BORDER_WAVEFORM: u8 = 0x3C;

/// Temperature sensor selection command (0x18)
///
/// Requires 1 byte: 0x80 = built-in sensor, 0x48 = external
pub const TEMP_SENSOR_CONTROL: u8 = 0x18;

/// Get status command (0x71)
///
/// Re-issued on every busy poll; the controller only refreshes the BUSY line
/// after receiving it.
pub const GET_STATUS: u8 = 0x71;

// RAM and data commands

/// Data entry mode command (0x11)
///
/// Controls the address counter auto-increment direction.
/// Requires 1 byte:
/// - Bit 0 (ID0): X direction (0=decrement, 1=increment)
/// - Bit 1 (ID1): Y direction (0=decrement, 1=increment)
/// - Bit 2 (AM): Address counter direction (0=X, 1=Y)
pub const DATA_ENTRY_MODE: u8 = 0x11;

/// Set RAM X address start/end command (0x44)
///
/// X is byte addressed.
/// Requires 2 bytes: [x_start >> 3, x_end >> 3]
pub const SET_RAM_X_RANGE: u8 = 0x44;

/// Set RAM Y address start/end command (0x45)
///
/// Requires 4 bytes: [start_LSB, start_MSB, end_LSB, end_MSB]
pub const SET_RAM_Y_RANGE: u8 = 0x45;

/// Set RAM X address counter command (0x4E)
///
/// Requires 1 byte: the RAM X address (byte column)
pub const SET_RAM_X_COUNTER: u8 = 0x4E;

/// Set RAM Y address counter command (0x4F)
///
/// Requires 2 bytes: [address_LSB, address_MSB]
pub const SET_RAM_Y_COUNTER: u8 = 0x4F;

/// Write to black plane RAM command (0x24)
///
/// Followed by `height * byte_stride` bytes of pixel data.
/// Bit=0: Black, Bit=1: White
pub const WRITE_RAM_BLACK: u8 = 0x24;

/// Write to red plane RAM command (0x26)
///
/// Followed by `height * byte_stride` bytes of pixel data.
/// Bit=1: Red (overrides the black plane for that pixel)
pub const WRITE_RAM_RED: u8 = 0x26;

// Display update commands

/// Display update control command (0x21)
///
/// Requires 2 bytes.
pub const DISPLAY_UPDATE_CTRL: u8 = 0x21;

/// Master activation command (0x20)
///
/// Triggers the display update sequence. BUSY stays asserted during the refresh.
pub const MASTER_ACTIVATION: u8 = 0x20;

// Power management commands

/// Deep sleep command (0x10)
///
/// Enters ultra-low power mode. Only a hardware reset can wake the controller.
/// Requires 1 byte: the deep sleep mode
pub const DEEP_SLEEP: u8 = 0x10;
