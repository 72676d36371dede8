//! Graphics support via embedded-graphics
//!
//! This module provides the [`GraphicDisplay`] struct which wraps [`Display`]
//! together with the two plane buffers and implements the
//! [`DrawTarget`](embedded_graphics_core::draw_target::DrawTarget) trait from
//! the embedded-graphics ecosystem.
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_graphics::{
//!     mono_font::{ascii::FONT_6X10, MonoTextStyle},
//!     prelude::*,
//!     primitives::{PrimitiveStyle, Rectangle},
//!     text::Text,
//! };
//! use epd2in13b_v4::{Color, GraphicDisplay};
//! # use core::convert::Infallible;
//! # use embedded_hal::delay::DelayNs;
//! # use embedded_hal::digital::{InputPin, OutputPin};
//! # use embedded_hal::spi::{Operation, SpiDevice};
//! # use epd2in13b_v4::{Builder, Display, Interface, Rotation};
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
//! # let mut delay = MockDelay;
//! # let interface = Interface::new(MockSpi, MockPin, MockPin, MockPin);
//! # let config = match Builder::new().rotation(Rotation::Rotate90).build() {
//! #     Ok(config) => config,
//! #     Err(_) => return,
//! # };
//! # let driver = match Display::new_initialized(interface, config, &mut delay) {
//! #     Ok(driver) => driver,
//! #     Err(_) => return,
//! # };
//! let mut display = match GraphicDisplay::try_new(driver, [0u8; 4000], [0u8; 4000]) {
//!     Ok(display) => display,
//!     Err(_) => return,
//! };
//!
//! display.clear(Color::White);
//!
//! let _ = Rectangle::new(Point::new(4, 4), Size::new(60, 20))
//!     .into_styled(PrimitiveStyle::with_fill(Color::Red))
//!     .draw(&mut display);
//!
//! let _ = Text::new(
//!     "Hello, E-Paper!",
//!     Point::new(10, 60),
//!     MonoTextStyle::new(&FONT_6X10, Color::Black),
//! )
//! .draw(&mut display);
//!
//! // Transfer both planes and refresh
//! let _ = display.update(&mut delay);
//! ```

use core::convert::Infallible;
use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    prelude::Pixel,
};
use embedded_hal::delay::DelayNs;

use crate::color::Color;
use crate::display::{Display, Plane};
use crate::error::Error;
use crate::interface::DisplayInterface;
use crate::rotation::apply_rotation;

/// Display with graphics buffers
///
/// This wrapper around [`Display`] owns the black and red plane buffers and
/// draws into them. Nothing reaches the panel until [`update`](Self::update).
///
/// ## Type Parameters
///
/// * `I` - Interface type implementing [`DisplayInterface`]
/// * `B1` - Buffer type implementing `AsMut<[u8]>` for the black plane
/// * `B2` - Buffer type implementing `AsMut<[u8]>` for the red plane
pub struct GraphicDisplay<I, B1, B2>
where
    I: DisplayInterface,
    B1: AsMut<[u8]>,
    B2: AsMut<[u8]>,
{
    /// The underlying display driver
    display: Display<I>,
    /// Buffer for the black plane
    black_buffer: B1,
    /// Buffer for the red plane
    red_buffer: B2,
}

type GraphicsResult<I> = core::result::Result<(), Error<I>>;
type GraphicsNewResult<I, T> = core::result::Result<T, Error<I>>;

impl<I, B1, B2> GraphicDisplay<I, B1, B2>
where
    I: DisplayInterface,
    B1: AsMut<[u8]>,
    B2: AsMut<[u8]>,
{
    /// Create a new GraphicDisplay
    ///
    /// # Panics
    ///
    /// Panics if either buffer is smaller than `dimensions.buffer_size()`.
    /// The size always follows the physical panel, whatever the rotation.
    pub fn new(display: Display<I>, mut black_buffer: B1, mut red_buffer: B2) -> Self {
        let required = display.dimensions().buffer_size();
        assert!(
            black_buffer.as_mut().len() >= required,
            "black_buffer too small: required {} bytes, got {}",
            required,
            black_buffer.as_mut().len()
        );
        assert!(
            red_buffer.as_mut().len() >= required,
            "red_buffer too small: required {} bytes, got {}",
            required,
            red_buffer.as_mut().len()
        );
        Self {
            display,
            black_buffer,
            red_buffer,
        }
    }

    /// Try to create a new GraphicDisplay, returning an error if buffers are too small
    ///
    /// # Errors
    ///
    /// Returns `Error::BufferSizeMismatch` naming the first plane whose buffer
    /// is smaller than `dimensions.buffer_size()`.
    pub fn try_new(
        display: Display<I>,
        mut black_buffer: B1,
        mut red_buffer: B2,
    ) -> GraphicsNewResult<I, Self> {
        let expected = display.dimensions().buffer_size();
        for (plane, provided) in [
            (Plane::Black, black_buffer.as_mut().len()),
            (Plane::Red, red_buffer.as_mut().len()),
        ] {
            if provided < expected {
                return Err(Error::BufferSizeMismatch {
                    plane,
                    expected,
                    provided,
                });
            }
        }
        Ok(Self {
            display,
            black_buffer,
            red_buffer,
        })
    }

    /// Fill both buffers with one color
    pub fn clear(&mut self, color: Color) {
        self.black_buffer.as_mut().fill(color.black_byte());
        self.red_buffer.as_mut().fill(color.red_byte());
    }

    /// Transfer both buffers to the panel and refresh
    ///
    /// # Errors
    ///
    /// Same as [`Display::display`]; the driver must be initialized.
    pub fn update<D: DelayNs>(&mut self, delay: &mut D) -> GraphicsResult<I> {
        let size = self.display.dimensions().buffer_size();
        self.display.display(
            &self.black_buffer.as_mut()[..size],
            &self.red_buffer.as_mut()[..size],
            delay,
        )
    }

    /// Access the underlying Display
    pub fn display(&self) -> &Display<I> {
        &self.display
    }

    /// Access the underlying Display mutably
    ///
    /// Use this for init, sleep and the other protocol operations.
    pub fn display_mut(&mut self) -> &mut Display<I> {
        &mut self.display
    }

    /// Split into the driver and both buffers
    pub fn into_parts(self) -> (Display<I>, B1, B2) {
        (self.display, self.black_buffer, self.red_buffer)
    }

    /// Set a single pixel to a color
    ///
    /// Coordinates are logical (rotated) and must already be inside the visible area.
    fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        let dims = self.display.dimensions();
        let rotation = self.display.rotation();
        let (index, bit) = apply_rotation(x, y, dims, rotation);

        if index >= self.black_buffer.as_mut().len() || index >= self.red_buffer.as_mut().len() {
            return;
        }

        let black = &mut self.black_buffer.as_mut()[index];
        if color.black_byte() == 0 {
            *black &= !bit;
        } else {
            *black |= bit;
        }

        let red = &mut self.red_buffer.as_mut()[index];
        if color.red_byte() == 0 {
            *red &= !bit;
        } else {
            *red |= bit;
        }
    }
}

impl<I, B1, B2> DrawTarget for GraphicDisplay<I, B1, B2>
where
    I: DisplayInterface,
    B1: AsMut<[u8]>,
    B2: AsMut<[u8]>,
{
    type Color = Color;
    type Error = Infallible;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let sz = self.size();

        for Pixel(Point { x, y }, color) in pixels {
            if x < 0 || y < 0 {
                continue;
            }

            let x = x as u32;
            let y = y as u32;

            if x >= sz.width || y >= sz.height {
                continue;
            }

            self.set_pixel(x, y, color);
        }

        Ok(())
    }
}

impl<I, B1, B2> OriginDimensions for GraphicDisplay<I, B1, B2>
where
    I: DisplayInterface,
    B1: AsMut<[u8]>,
    B2: AsMut<[u8]>,
{
    fn size(&self) -> Size {
        let (width, height) = self.display.config().rotated_size();
        Size::new(u32::from(width), u32::from(height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Builder, Rotation};
    use alloc::vec;
    use alloc::vec::Vec;
    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[derive(Debug, Default)]
    struct MockInterface {
        commands: Vec<u8>,
        data: Vec<u8>,
    }

    impl DisplayInterface for MockInterface {
        type Error = core::convert::Infallible;

        fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
            self.commands.push(command);
            Ok(())
        }

        fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
            self.data.extend_from_slice(data);
            Ok(())
        }

        fn send_data_repeated(&mut self, value: u8, count: usize) -> Result<(), Self::Error> {
            self.data.extend(core::iter::repeat_n(value, count));
            Ok(())
        }

        fn set_reset(&mut self, _high: bool) -> Result<(), Self::Error> {
            Ok(())
        }

        fn is_busy(&mut self) -> Result<bool, Self::Error> {
            Ok(false)
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn test_display(rotation: Rotation) -> Display<MockInterface> {
        let config = Builder::new().rotation(rotation).build().unwrap();
        Display::new(MockInterface::default(), config)
    }

    fn graphic_display(rotation: Rotation) -> GraphicDisplay<MockInterface, Vec<u8>, Vec<u8>> {
        let display = test_display(rotation);
        let size = display.dimensions().buffer_size();
        let mut gd = GraphicDisplay::new(display, vec![0u8; size], vec![0u8; size]);
        gd.clear(Color::White);
        gd
    }

    #[test]
    fn test_size_follows_visible_area_and_rotation() {
        assert_eq!(graphic_display(Rotation::Rotate0).size(), Size::new(122, 250));
        assert_eq!(graphic_display(Rotation::Rotate90).size(), Size::new(250, 122));
        assert_eq!(graphic_display(Rotation::Rotate270).size(), Size::new(250, 122));
    }

    #[test]
    fn test_buffer_size_uses_physical_dimensions() {
        let display = test_display(Rotation::Rotate90);
        assert_eq!(display.dimensions().buffer_size(), 16 * 250);
    }

    #[test]
    fn test_try_new_small_black_buffer_returns_error() {
        let display = test_display(Rotation::Rotate0);
        let required = display.dimensions().buffer_size();

        let result = GraphicDisplay::try_new(display, vec![0u8; required - 1], vec![0u8; required]);
        assert!(matches!(
            result,
            Err(Error::BufferSizeMismatch {
                plane: Plane::Black,
                ..
            })
        ));
    }

    #[test]
    fn test_try_new_small_red_buffer_returns_error() {
        let display = test_display(Rotation::Rotate0);
        let required = display.dimensions().buffer_size();

        let result = GraphicDisplay::try_new(display, vec![0u8; required], vec![0u8; required - 1]);
        assert!(matches!(
            result,
            Err(Error::BufferSizeMismatch {
                plane: Plane::Red,
                expected: 4000,
                provided: 3999,
            })
        ));
    }

    #[test]
    fn test_try_new_valid_buffers_succeeds() {
        let display = test_display(Rotation::Rotate0);
        let required = display.dimensions().buffer_size();

        let result = GraphicDisplay::try_new(display, vec![0u8; required], vec![0u8; required]);
        assert!(result.is_ok());
    }

    #[test]
    #[should_panic(expected = "black_buffer too small")]
    fn test_new_panics_on_small_black_buffer() {
        let display = test_display(Rotation::Rotate0);
        let required = display.dimensions().buffer_size();

        let _ = GraphicDisplay::new(display, vec![0u8; required - 1], vec![0u8; required]);
    }

    #[test]
    fn test_clear_fills_both_planes() {
        let mut gd = graphic_display(Rotation::Rotate0);
        gd.clear(Color::Red);

        let (_, black, red) = gd.into_parts();
        assert!(black.iter().all(|&b| b == 0xFF));
        assert!(red.iter().all(|&b| b == 0x00));
    }

    #[test]
    fn test_pixels_set_both_planes() {
        let mut gd = graphic_display(Rotation::Rotate0);
        gd.draw_iter([
            Pixel(Point::new(0, 0), Color::Black),
            Pixel(Point::new(1, 0), Color::Red),
        ])
        .unwrap();

        let (_, black, red) = gd.into_parts();
        assert_eq!(black[0], 0x7F);
        assert_eq!(red[0], 0xBF);
    }

    #[test]
    fn test_pixels_outside_visible_area_are_dropped() {
        let mut gd = graphic_display(Rotation::Rotate0);
        gd.draw_iter([
            Pixel(Point::new(122, 0), Color::Black),
            Pixel(Point::new(0, 250), Color::Black),
            Pixel(Point::new(-1, 3), Color::Black),
        ])
        .unwrap();

        let (_, black, _) = gd.into_parts();
        assert!(black.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_rotated_drawing() {
        let mut gd = graphic_display(Rotation::Rotate90);
        gd.draw_iter([Pixel(Point::new(0, 0), Color::Black)]).unwrap();

        let (_, black, _) = gd.into_parts();
        assert_eq!(black[15], !0x40);
    }

    #[test]
    fn test_draw_rectangle() {
        let mut gd = graphic_display(Rotation::Rotate0);
        Rectangle::new(Point::new(0, 1), Size::new(8, 2))
            .into_styled(PrimitiveStyle::with_fill(Color::Black))
            .draw(&mut gd)
            .unwrap();

        let (_, black, _) = gd.into_parts();
        assert_eq!(black[0], 0xFF);
        assert_eq!(black[16], 0x00);
        assert_eq!(black[32], 0x00);
        assert_eq!(black[48], 0xFF);
    }

    #[test]
    fn test_update_requires_init() {
        let mut gd = graphic_display(Rotation::Rotate0);
        let result = gd.update(&mut NoDelay);
        assert!(matches!(result, Err(Error::InvalidState { .. })));
    }

    #[test]
    fn test_update_transfers_both_planes() {
        let mut gd = graphic_display(Rotation::Rotate0);
        gd.display_mut().init(&mut NoDelay).unwrap();
        gd.draw_iter([Pixel(Point::new(8, 0), Color::Red)]).unwrap();
        gd.update(&mut NoDelay).unwrap();

        let (display, _, _) = gd.into_parts();
        let interface = display.release();
        let data = &interface.data[interface.data.len() - 8000..];
        assert_eq!(data[1], 0xFF);
        assert_eq!(data[4000 + 1], 0x7F);
        assert!(interface.commands.ends_with(&[0x24, 0x26, 0x20, 0x71]));
    }
}
