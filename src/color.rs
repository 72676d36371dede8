//! Colors of the black/white/red panel
//!
//! Every pixel is one bit in each plane. The black plane is 0 for black and
//! 1 for white. With the default display update control (`0x80` inverts red
//! RAM) the red plane is active-low: 0 shows red, 1 leaves the pixel alone.
//!
//! | Color | Black plane | Red plane |
//! |-------|-------------|-----------|
//! | Black | 0           | 1         |
//! | White | 1           | 1         |
//! | Red   | 1           | 0         |
//!
//! ## Example
//!
//! ```
//! use epd2in13b_v4::Color;
//!
//! // Fill bytes for a solid white panel
//! assert_eq!(Color::White.black_byte(), 0xFF);
//! assert_eq!(Color::White.red_byte(), 0xFF);
//!
//! // Solid red keeps the black plane white
//! assert_eq!(Color::Red.black_byte(), 0xFF);
//! assert_eq!(Color::Red.red_byte(), 0x00);
//! ```

/// Colors the panel can show
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Color {
    /// Black pixels
    Black,
    /// White pixels
    White,
    /// Red pixels
    Red,
}

#[cfg(feature = "graphics")]
impl embedded_graphics_core::prelude::PixelColor for Color {
    type Raw = embedded_graphics_core::pixelcolor::raw::RawU8;
}

impl Color {
    /// Fill byte for the black plane
    pub fn black_byte(self) -> u8 {
        match self {
            Self::Black => 0x00,
            Self::White | Self::Red => 0xFF,
        }
    }

    /// Fill byte for the red plane
    pub fn red_byte(self) -> u8 {
        match self {
            Self::Black | Self::White => 0xFF,
            Self::Red => 0x00,
        }
    }
}
