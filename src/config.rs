//! Display configuration types and builder

pub use crate::error::BuilderError;

/// Maximum gate outputs (rows) supported by the controller
pub const MAX_GATE_OUTPUTS: u16 = 296;
/// Maximum source outputs (columns) supported by the controller
pub const MAX_SOURCE_OUTPUTS: u16 = 176;

/// Visible width of the 2.13" (B) V4 panel in pixels
pub const PANEL_WIDTH: u16 = 122;
/// Height of the 2.13" (B) V4 panel in pixels
pub const PANEL_HEIGHT: u16 = 250;

/// Default timeout for busy-wait in milliseconds
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 30_000;

/// Display dimensions
///
/// The controller RAM is byte addressed along X, so the width is rounded up
/// to the next multiple of 8. The panel's real width is kept as `visible_width`.
/// Only [`Dimensions::new`] and `Default` construct values, so every
/// `Dimensions` is non-empty and within the controller limits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dimensions {
    width: u16,
    visible_width: u16,
    height: u16,
}

impl Dimensions {
    /// Create new dimensions with validation
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidDimensions` if:
    /// - width or height is zero
    /// - width > MAX_SOURCE_OUTPUTS
    /// - height > MAX_GATE_OUTPUTS
    pub fn new(width: u16, height: u16) -> Result<Self, BuilderError> {
        if width == 0 || width > MAX_SOURCE_OUTPUTS {
            return Err(BuilderError::InvalidDimensions { width, height });
        }
        if height == 0 || height > MAX_GATE_OUTPUTS {
            return Err(BuilderError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width: width.div_ceil(8) * 8,
            visible_width: width,
            height,
        })
    }

    /// Width in pixels, rounded up to a multiple of 8
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Width in pixels as wired on the panel
    pub fn visible_width(&self) -> u16 {
        self.visible_width
    }

    /// Height in pixels (gate outputs)
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Bytes per pixel row
    pub fn byte_stride(&self) -> usize {
        self.width as usize / 8
    }

    /// Calculate required buffer size in bytes for one plane
    pub fn buffer_size(&self) -> usize {
        self.byte_stride() * self.height as usize
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: PANEL_WIDTH.div_ceil(8) * 8,
            visible_width: PANEL_WIDTH,
            height: PANEL_HEIGHT,
        }
    }
}

/// Display rotation relative to native orientation
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Rotation {
    /// No rotation
    #[default]
    Rotate0,
    /// Rotate 90 degrees clockwise
    Rotate90,
    /// Rotate 180 degrees
    Rotate180,
    /// Rotate 270 degrees clockwise
    Rotate270,
}

/// Deep sleep mode sent with the deep sleep command
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(u8)]
pub enum DeepSleepMode {
    /// Deep sleep mode 1, RAM content is preserved
    #[default]
    Mode1 = 0x01,
    /// Deep sleep mode 2, RAM content is not preserved
    Mode2 = 0x03,
}

/// Hardware reset pulse timing in milliseconds
///
/// RST is driven high, then low, then high again.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResetTiming {
    /// Time RST is held high before the pulse
    pub settle_ms: u32,
    /// Length of the low pulse
    pub pulse_ms: u32,
    /// Time to wait after RST is released
    pub recover_ms: u32,
}

impl Default for ResetTiming {
    fn default() -> Self {
        Self {
            settle_ms: 50,
            pulse_ms: 2,
            recover_ms: 50,
        }
    }
}

/// Display configuration
///
/// Holds the register values and timings the protocol engine sends to the
/// controller. Use `Builder` to create a Config; the defaults match the
/// 2.13" (B) V4 panel.
#[derive(Clone, Debug)]
pub struct Config {
    /// Display dimensions
    pub dimensions: Dimensions,
    /// Rotation applied by the graphics adapter
    pub rotation: Rotation,
    /// Scanning flags (third byte of driver output control)
    pub gate_scanning: u8,
    /// Data entry mode byte
    pub data_entry_mode: u8,
    /// Border waveform setting
    pub border_waveform: u8,
    /// Temperature sensor selection
    pub temp_sensor_control: u8,
    /// Display update control bytes
    pub display_update_control: [u8; 2],
    /// Mode byte sent with the deep sleep command
    pub deep_sleep_mode: DeepSleepMode,
    /// Hardware reset pulse timing
    pub reset_timing: ResetTiming,
    /// Interval between status polls while BUSY is asserted
    pub busy_poll_interval_ms: u32,
    /// Busy-wait bound in milliseconds, 0 waits forever
    pub busy_timeout_ms: u32,
    /// Time given to the controller to latch deep sleep before RST is pulled low
    pub sleep_settle_ms: u32,
}

impl Config {
    /// Get the rotated visible dimensions as (width, height)
    pub fn rotated_size(&self) -> (u16, u16) {
        let dims = self.dimensions;
        let (visible_width, height) = (dims.visible_width(), dims.height());
        match self.rotation {
            Rotation::Rotate0 | Rotation::Rotate180 => (visible_width, height),
            Rotation::Rotate90 | Rotation::Rotate270 => (height, visible_width),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Builder::new().into_config(Dimensions::default())
    }
}

/// Builder for constructing display configuration
///
/// # Example
///
/// ```rust,no_run
/// use epd2in13b_v4::{Builder, Dimensions, Rotation};
///
/// let dims = match Dimensions::new(122, 250) {
///     Ok(dims) => dims,
///     Err(_) => return,
/// };
/// let config = match Builder::new()
///     .dimensions(dims)
///     .rotation(Rotation::Rotate90)
///     .busy_timeout_ms(10_000)
///     .build()
/// {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// assert_eq!(config.dimensions.buffer_size(), 4000);
/// ```
#[must_use]
pub struct Builder {
    dimensions: Option<Dimensions>,
    rotation: Rotation,
    gate_scanning: u8,
    data_entry_mode: u8,
    border_waveform: u8,
    temp_sensor_control: u8,
    display_update_control: [u8; 2],
    deep_sleep_mode: DeepSleepMode,
    reset_timing: ResetTiming,
    busy_poll_interval_ms: u32,
    busy_timeout_ms: u32,
    sleep_settle_ms: u32,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            dimensions: None,
            rotation: Rotation::Rotate0,
            gate_scanning: 0x00,
            // X increment, Y increment
            data_entry_mode: 0x03,
            border_waveform: 0x05,
            // Built-in temperature sensor
            temp_sensor_control: 0x80,
            // Both bytes are written literally, as the panel vendor does
            display_update_control: [0x80, 0x80],
            deep_sleep_mode: DeepSleepMode::Mode1,
            reset_timing: ResetTiming::default(),
            busy_poll_interval_ms: 10,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            sleep_settle_ms: 2_000,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set display dimensions
    ///
    /// Defaults to the 122x250 panel when not called.
    pub fn dimensions(mut self, dims: Dimensions) -> Self {
        self.dimensions = Some(dims);
        self
    }

    /// Set display rotation
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the scanning flags of driver output control
    pub fn gate_scanning(mut self, value: u8) -> Self {
        self.gate_scanning = value;
        self
    }

    /// Set data entry mode
    pub fn data_entry_mode(mut self, value: u8) -> Self {
        self.data_entry_mode = value;
        self
    }

    /// Set border waveform
    pub fn border_waveform(mut self, value: u8) -> Self {
        self.border_waveform = value;
        self
    }

    /// Set temperature sensor selection
    pub fn temp_sensor_control(mut self, value: u8) -> Self {
        self.temp_sensor_control = value;
        self
    }

    /// Set display update control bytes
    pub fn display_update_control(mut self, value: [u8; 2]) -> Self {
        self.display_update_control = value;
        self
    }

    /// Set the deep sleep mode
    pub fn deep_sleep_mode(mut self, mode: DeepSleepMode) -> Self {
        self.deep_sleep_mode = mode;
        self
    }

    /// Set hardware reset timing
    pub fn reset_timing(mut self, timing: ResetTiming) -> Self {
        self.reset_timing = timing;
        self
    }

    /// Set the interval between status polls
    pub fn busy_poll_interval_ms(mut self, value: u32) -> Self {
        self.busy_poll_interval_ms = value;
        self
    }

    /// Set the busy-wait timeout
    ///
    /// Default is 30,000ms (30 seconds). Set to 0 to disable timeout.
    pub fn busy_timeout_ms(mut self, value: u32) -> Self {
        self.busy_timeout_ms = value;
        self
    }

    /// Set the deep sleep settle time
    pub fn sleep_settle_ms(mut self, value: u32) -> Self {
        self.sleep_settle_ms = value;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidTiming` if a busy timeout is set with a
    /// zero poll interval, since the timeout could never elapse.
    pub fn build(self) -> Result<Config, BuilderError> {
        if self.busy_timeout_ms > 0 && self.busy_poll_interval_ms == 0 {
            return Err(BuilderError::InvalidTiming {
                busy_poll_interval_ms: self.busy_poll_interval_ms,
                busy_timeout_ms: self.busy_timeout_ms,
            });
        }
        let dimensions = self.dimensions.unwrap_or_default();
        Ok(self.into_config(dimensions))
    }

    fn into_config(self, dimensions: Dimensions) -> Config {
        Config {
            dimensions,
            rotation: self.rotation,
            gate_scanning: self.gate_scanning,
            data_entry_mode: self.data_entry_mode,
            border_waveform: self.border_waveform,
            temp_sensor_control: self.temp_sensor_control,
            display_update_control: self.display_update_control,
            deep_sleep_mode: self.deep_sleep_mode,
            reset_timing: self.reset_timing,
            busy_poll_interval_ms: self.busy_poll_interval_ms,
            busy_timeout_ms: self.busy_timeout_ms,
            sleep_settle_ms: self.sleep_settle_ms,
        }
    }
}
