//! Controller protocol engine
//!
//! [`Display`] owns the hardware interface and drives the controller through
//! its command protocol: hardware reset, register configuration, busy polling,
//! RAM window/cursor addressing and plane transfers.
//!
//! The driver tracks the controller state explicitly:
//!
//! ```text
//! Unpowered --reset--> Reset --soft reset--> SoftResetPending --configure--> Configured
//!     ^                                                                          |
//!     +---------------------------------- sleep ---------------------------------+
//! ```
//!
//! Only `init` is accepted outside `Configured`; everything else is rejected
//! with [`Error::InvalidState`].

use embedded_hal::delay::DelayNs;
use log::{debug, info, trace, warn};

use crate::color::Color;
use crate::command::{
    BORDER_WAVEFORM, DATA_ENTRY_MODE, DEEP_SLEEP, DISPLAY_UPDATE_CTRL, DRIVER_OUTPUT_CONTROL,
    GET_STATUS, MASTER_ACTIVATION, SET_RAM_X_COUNTER, SET_RAM_X_RANGE, SET_RAM_Y_COUNTER,
    SET_RAM_Y_RANGE, SOFT_RESET, TEMP_SENSOR_CONTROL, WRITE_RAM_BLACK, WRITE_RAM_RED,
};
use crate::config::{Config, Dimensions, Rotation};
use crate::error::Error;
use crate::interface::DisplayInterface;

type DisplayResult<I> = core::result::Result<(), Error<I>>;

/// Controller state as tracked by the driver
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum State {
    /// Not initialized, or put to sleep
    #[default]
    Unpowered,
    /// Hardware reset done, waiting for the controller to come up
    Reset,
    /// Software reset issued, registers not yet configured
    SoftResetPending,
    /// Ready for RAM writes and refreshes
    Configured,
}

/// Colour plane of the controller RAM
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Plane {
    /// Black/white plane (0=black, 1=white)
    Black,
    /// Red plane (0=red, with the default update control inverting red RAM)
    Red,
}

impl Plane {
    /// Command that starts a RAM write to this plane
    pub fn ram_command(self) -> u8 {
        match self {
            Self::Black => WRITE_RAM_BLACK,
            Self::Red => WRITE_RAM_RED,
        }
    }
}

/// Protocol driver for the 2.13" (B) V4 panel
///
/// The driver takes ownership of the interface, and with it the SPI device
/// and control lines. Every operation needs `&mut self`, so a panel can only
/// be driven from one place at a time.
///
/// ## Example
///
/// ```rust,no_run
/// use embedded_hal::delay::DelayNs;
/// use epd2in13b_v4::{Builder, Color, Display, Interface};
/// # use core::convert::Infallible;
/// # use embedded_hal::digital::{InputPin, OutputPin};
/// # use embedded_hal::spi::{Operation, SpiDevice};
/// # struct MockSpi;
/// # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
/// # impl SpiDevice for MockSpi {
/// #     fn transaction(
/// #         &mut self,
/// #         _operations: &mut [Operation<'_, u8>],
/// #     ) -> Result<(), Self::Error> {
/// #         Ok(())
/// #     }
/// # }
/// # struct MockPin;
/// # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
/// # impl OutputPin for MockPin {
/// #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
/// #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
/// # }
/// # impl InputPin for MockPin {
/// #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(false) }
/// #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(true) }
/// # }
/// # struct MockDelay;
/// # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
/// # let mut delay = MockDelay;
/// let interface = Interface::new(MockSpi, MockPin, MockPin, MockPin);
/// let config = match Builder::new().build() {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// let mut display = match Display::new_initialized(interface, config, &mut delay) {
///     Ok(display) => display,
///     Err(_) => return,
/// };
///
/// let _ = display.clear_to(Color::White, &mut delay);
///
/// let black = [0xFFu8; 4000];
/// let red = [0x00u8; 4000];
/// let _ = display.display(&black, &red, &mut delay);
///
/// let _ = display.sleep(&mut delay);
/// ```
pub struct Display<I>
where
    I: DisplayInterface,
{
    /// Hardware interface
    interface: I,
    /// Display configuration
    config: Config,
    /// Controller state
    state: State,
}

impl<I> Display<I>
where
    I: DisplayInterface,
{
    /// Create a new Display instance
    ///
    /// Nothing is sent to the controller until [`init`](Self::init) runs.
    pub fn new(interface: I, config: Config) -> Self {
        Self {
            interface,
            config,
            state: State::Unpowered,
        }
    }

    /// Create a new Display instance and initialize the controller
    pub fn new_initialized<D: DelayNs>(
        interface: I,
        config: Config,
        delay: &mut D,
    ) -> Result<Self, Error<I>> {
        let mut display = Self::new(interface, config);
        display.init(delay)?;
        Ok(display)
    }

    /// Perform hardware reset, software reset, and register configuration
    ///
    /// Accepted in any state. This is the only way back to `Configured` after
    /// [`sleep`](Self::sleep) or after a failed operation.
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.state = State::Unpowered;
        self.interface
            .reset(delay, self.config.reset_timing)
            .map_err(Error::Interface)?;
        self.state = State::Reset;
        self.wait_while_busy(delay)?;

        self.send_command(SOFT_RESET)?;
        self.state = State::SoftResetPending;
        self.wait_while_busy(delay)?;

        // Driver output control
        let last_row = self.config.dimensions.height() - 1;
        self.send_command(DRIVER_OUTPUT_CONTROL)?;
        self.send_data(&[
            (last_row & 0xFF) as u8,
            (last_row >> 8) as u8,
            self.config.gate_scanning,
        ])?;

        self.send_command(DATA_ENTRY_MODE)?;
        self.send_data(&[self.config.data_entry_mode])?;

        let dims = self.config.dimensions;
        self.write_window(0, 0, dims.width() - 1, dims.height() - 1)?;
        self.write_cursor(0, 0)?;

        self.send_command(BORDER_WAVEFORM)?;
        self.send_data(&[self.config.border_waveform])?;

        self.send_command(TEMP_SENSOR_CONTROL)?;
        self.send_data(&[self.config.temp_sensor_control])?;

        self.send_command(DISPLAY_UPDATE_CTRL)?;
        let update_control = self.config.display_update_control;
        self.send_data(&update_control)?;

        self.wait_while_busy(delay)?;
        self.state = State::Configured;
        info!("display initialized");
        Ok(())
    }

    /// Wake the controller from deep sleep
    ///
    /// Same as [`init`](Self::init); deep sleep is only left through a hardware reset.
    pub fn wake_up<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.init(delay)
    }

    /// Wait until the controller has finished its current operation
    ///
    /// # Errors
    ///
    /// Returns `Error::BusyTimeout` if BUSY is still asserted after
    /// `config.busy_timeout_ms`.
    pub fn wait_until_idle<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.ensure_configured("wait until idle")?;
        self.wait_while_busy(delay)
    }

    /// Set the RAM window for subsequent writes
    ///
    /// X coordinates are pixels and are sent byte addressed (`x >> 3`); Y
    /// coordinates are rows. Both ends are inclusive.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidWindow` if the window is inverted or leaves the panel.
    pub fn set_window(
        &mut self,
        x_start: u16,
        y_start: u16,
        x_end: u16,
        y_end: u16,
    ) -> DisplayResult<I> {
        self.ensure_configured("set window")?;
        let dims = self.config.dimensions;
        let (width, height) = (dims.width(), dims.height());
        if x_start > x_end || y_start > y_end || x_end >= width || y_end >= height {
            return Err(Error::InvalidWindow {
                x_start,
                y_start,
                x_end,
                y_end,
            });
        }
        self.write_window(x_start, y_start, x_end, y_end)
    }

    /// Set the RAM address counter
    ///
    /// `x` is the RAM X address in bytes (8 pixels per step), `y` is the row.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidCursor` if the address is outside the panel.
    pub fn set_cursor(&mut self, x: u16, y: u16) -> DisplayResult<I> {
        self.ensure_configured("set cursor")?;
        let dims = self.config.dimensions;
        if x as usize >= dims.byte_stride() || y >= dims.height() {
            return Err(Error::InvalidCursor { x, y });
        }
        self.write_cursor(x, y)
    }

    /// Fill both planes with constant bytes and refresh
    ///
    /// # Arguments
    ///
    /// * `black_fill` - Byte repeated over the black plane
    /// * `red_fill` - Byte repeated over the red plane
    /// * `delay` - Delay implementation for busy-waiting
    pub fn clear<D: DelayNs>(
        &mut self,
        black_fill: u8,
        red_fill: u8,
        delay: &mut D,
    ) -> DisplayResult<I> {
        self.ensure_configured("clear")?;
        let size = self.config.dimensions.buffer_size();

        self.send_command(WRITE_RAM_BLACK)?;
        self.interface
            .send_data_repeated(black_fill, size)
            .map_err(Error::Interface)?;

        self.send_command(WRITE_RAM_RED)?;
        self.interface
            .send_data_repeated(red_fill, size)
            .map_err(Error::Interface)?;

        self.refresh(delay)
    }

    /// Fill the whole panel with one colour and refresh
    pub fn clear_to<D: DelayNs>(&mut self, color: Color, delay: &mut D) -> DisplayResult<I> {
        self.clear(color.black_byte(), color.red_byte(), delay)
    }

    /// Write one plane to controller RAM without refreshing
    ///
    /// # Errors
    ///
    /// Returns `Error::BufferSizeMismatch` unless `data` has exactly
    /// `dimensions.buffer_size()` bytes.
    pub fn write_plane(&mut self, plane: Plane, data: &[u8]) -> DisplayResult<I> {
        self.ensure_configured("write plane")?;
        self.check_plane(plane, data)?;
        self.write_plane_unchecked(plane, data)
    }

    /// Transfer both planes and refresh the panel
    ///
    /// # Arguments
    ///
    /// * `black` - Black/white plane, row-major, `byte_stride` bytes per row
    /// * `red` - Red plane, same layout
    /// * `delay` - Delay implementation for busy-waiting
    ///
    /// # Errors
    ///
    /// Returns `Error::BufferSizeMismatch` before anything is sent if either
    /// plane does not have exactly `dimensions.buffer_size()` bytes.
    pub fn display<D: DelayNs>(
        &mut self,
        black: &[u8],
        red: &[u8],
        delay: &mut D,
    ) -> DisplayResult<I> {
        self.ensure_configured("display")?;
        self.check_plane(Plane::Black, black)?;
        self.check_plane(Plane::Red, red)?;

        self.write_plane_unchecked(Plane::Black, black)?;
        self.write_plane_unchecked(Plane::Red, red)?;
        self.refresh(delay)
    }

    /// Trigger a refresh from controller RAM and wait for it to finish
    pub fn turn_on_display<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.ensure_configured("turn on display")?;
        self.refresh(delay)
    }

    /// Enter deep sleep and hold the controller in reset
    ///
    /// The driver is `Unpowered` afterwards; call [`init`](Self::init) to use
    /// the panel again.
    pub fn sleep<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.ensure_configured("sleep")?;
        self.send_command(DEEP_SLEEP)?;
        self.send_data(&[self.config.deep_sleep_mode as u8])?;
        self.state = State::Unpowered;

        delay.delay_ms(self.config.sleep_settle_ms);
        self.interface.set_reset(false).map_err(Error::Interface)?;
        debug!("display asleep");
        Ok(())
    }

    /// Current controller state
    pub fn state(&self) -> State {
        self.state
    }

    /// Get display dimensions
    pub fn dimensions(&self) -> &Dimensions {
        &self.config.dimensions
    }

    /// Get display rotation
    pub fn rotation(&self) -> Rotation {
        self.config.rotation
    }

    /// Access the underlying configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Give back the interface
    pub fn release(self) -> I {
        self.interface
    }

    /// Poll BUSY, re-issuing the status command on every iteration
    ///
    /// The controller only updates BUSY in response to the status command,
    /// so it is sent once up front and again before each wait. A zero poll
    /// interval counts as 1ms so a non-zero timeout always fires.
    fn wait_while_busy<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        debug!("display busy");
        self.send_command(GET_STATUS)?;

        let interval = self.config.busy_poll_interval_ms.max(1);
        let timeout = self.config.busy_timeout_ms;
        let mut waited_ms: u32 = 0;

        while self.interface.is_busy().map_err(Error::Interface)? {
            self.send_command(GET_STATUS)?;
            delay.delay_ms(interval);
            waited_ms = waited_ms.saturating_add(interval);
            if timeout > 0 && waited_ms >= timeout {
                warn!("display still busy after {}ms", waited_ms);
                return Err(Error::BusyTimeout { waited_ms });
            }
        }

        debug!("display free");
        Ok(())
    }

    fn refresh<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.send_command(MASTER_ACTIVATION)?;
        self.wait_while_busy(delay)
    }

    fn write_window(
        &mut self,
        x_start: u16,
        y_start: u16,
        x_end: u16,
        y_end: u16,
    ) -> DisplayResult<I> {
        trace!(
            "RAM window x {}..={}, y {}..={}",
            x_start, x_end, y_start, y_end
        );
        self.send_command(SET_RAM_X_RANGE)?;
        self.send_data(&[((x_start >> 3) & 0xFF) as u8, ((x_end >> 3) & 0xFF) as u8])?;

        self.send_command(SET_RAM_Y_RANGE)?;
        self.send_data(&[
            (y_start & 0xFF) as u8,
            (y_start >> 8) as u8,
            (y_end & 0xFF) as u8,
            (y_end >> 8) as u8,
        ])
    }

    fn write_cursor(&mut self, x: u16, y: u16) -> DisplayResult<I> {
        trace!("RAM cursor x {}, y {}", x, y);
        self.send_command(SET_RAM_X_COUNTER)?;
        self.send_data(&[(x & 0xFF) as u8])?;

        self.send_command(SET_RAM_Y_COUNTER)?;
        self.send_data(&[(y & 0xFF) as u8, (y >> 8) as u8])
    }

    fn write_plane_unchecked(&mut self, plane: Plane, data: &[u8]) -> DisplayResult<I> {
        self.send_command(plane.ram_command())?;
        self.send_data(data)
    }

    fn check_plane(&self, plane: Plane, data: &[u8]) -> DisplayResult<I> {
        let expected = self.config.dimensions.buffer_size();
        if data.len() != expected {
            return Err(Error::BufferSizeMismatch {
                plane,
                expected,
                provided: data.len(),
            });
        }
        Ok(())
    }

    fn ensure_configured(&self, operation: &'static str) -> DisplayResult<I> {
        if self.state != State::Configured {
            warn!("rejected {} while {:?}", operation, self.state);
            return Err(Error::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    /// Send a command to the display controller
    fn send_command(&mut self, cmd: u8) -> DisplayResult<I> {
        self.interface.send_command(cmd).map_err(Error::Interface)
    }

    /// Send data to the display controller
    fn send_data(&mut self, data: &[u8]) -> DisplayResult<I> {
        self.interface.send_data(data).map_err(Error::Interface)
    }
}
