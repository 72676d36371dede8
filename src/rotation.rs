//! Coordinate rotation utilities
//!
//! Planes are stored row-major with 8 horizontal pixels per byte, MSB first.
//! The panel is 122 pixels wide but each row is padded to 128 bits, so a
//! rotated logical coordinate is first mapped onto the visible physical
//! pixel and then onto its byte and bit in the padded row.
//!
//! ## Rotation Modes
//!
//! - **Rotate0**: Native orientation, origin at the top-left
//! - **Rotate90**: 90° clockwise, width and height swapped
//! - **Rotate180**: 180° rotation, origin at bottom-right
//! - **Rotate270**: 270° clockwise (or 90° counter-clockwise)
//!
//! ## Example
//!
//! ```
//! use epd2in13b_v4::{rotation::apply_rotation, Dimensions, Rotation};
//!
//! let dims = Dimensions::default(); // 122x250, 16 bytes per row
//!
//! // Pixel (0,0) is at byte 0, bit 7 (MSB)
//! assert_eq!(apply_rotation(0, 0, &dims, Rotation::Rotate0), (0, 0x80));
//!
//! // The last visible pixel of row 0 sits in byte 15 before the padding bits
//! assert_eq!(apply_rotation(121, 0, &dims, Rotation::Rotate0), (15, 0x40));
//! ```

use crate::config::{Dimensions, Rotation};

/// Apply rotation transformation to get buffer index and bit mask
///
/// # Arguments
///
/// * `x` - Logical column, 0 to rotated width - 1
/// * `y` - Logical row, 0 to rotated height - 1
/// * `dims` - Physical panel dimensions
/// * `rotation` - Rotation mode
///
/// # Returns
///
/// Returns a tuple of (byte_index, bit_mask). Coordinates must lie inside
/// the rotated visible area (see [`Config::rotated_size`](crate::Config::rotated_size)).
pub fn apply_rotation(x: u32, y: u32, dims: &Dimensions, rotation: Rotation) -> (usize, u8) {
    let visible_width = u32::from(dims.visible_width());
    let height = u32::from(dims.height());

    let (px, py) = match rotation {
        Rotation::Rotate0 => (x, y),
        Rotation::Rotate90 => (visible_width - 1 - y, x),
        Rotation::Rotate180 => (visible_width - 1 - x, height - 1 - y),
        Rotation::Rotate270 => (y, height - 1 - x),
    };

    let index = (px / 8) as usize + dims.byte_stride() * py as usize;
    let bit = 0x80 >> (px % 8);
    (index, bit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> Dimensions {
        Dimensions::default()
    }

    #[test]
    fn test_rotate0() {
        let dims = panel();
        assert_eq!(apply_rotation(0, 0, &dims, Rotation::Rotate0), (0, 0x80));
        assert_eq!(apply_rotation(1, 0, &dims, Rotation::Rotate0), (0, 0x40));
        assert_eq!(apply_rotation(7, 0, &dims, Rotation::Rotate0), (0, 0x01));
        // next row starts after the padded stride
        assert_eq!(apply_rotation(0, 1, &dims, Rotation::Rotate0), (16, 0x80));
    }

    #[test]
    fn test_rotate180() {
        let dims = panel();
        // origin lands on the last visible pixel of the last row
        assert_eq!(
            apply_rotation(0, 0, &dims, Rotation::Rotate180),
            (15 + 16 * 249, 0x40)
        );
        assert_eq!(
            apply_rotation(121, 249, &dims, Rotation::Rotate180),
            (0, 0x80)
        );
    }

    #[test]
    fn test_rotate90() {
        let dims = panel();
        // logical x runs down the panel, logical y runs right to left
        assert_eq!(apply_rotation(0, 0, &dims, Rotation::Rotate90), (15, 0x40));
        assert_eq!(apply_rotation(249, 0, &dims, Rotation::Rotate90), (15 + 16 * 249, 0x40));
        assert_eq!(apply_rotation(0, 121, &dims, Rotation::Rotate90), (0, 0x80));
    }

    #[test]
    fn test_rotate270() {
        let dims = panel();
        assert_eq!(
            apply_rotation(0, 0, &dims, Rotation::Rotate270),
            (16 * 249, 0x80)
        );
        assert_eq!(apply_rotation(249, 121, &dims, Rotation::Rotate270), (15, 0x40));
    }

    #[test]
    fn test_padding_bits_never_addressed() {
        let dims = panel();
        for rotation in [
            Rotation::Rotate0,
            Rotation::Rotate90,
            Rotation::Rotate180,
            Rotation::Rotate270,
        ] {
            let (w, h) = match rotation {
                Rotation::Rotate0 | Rotation::Rotate180 => (122, 250),
                Rotation::Rotate90 | Rotation::Rotate270 => (250, 122),
            };
            for y in 0..h {
                for x in 0..w {
                    let (index, bit) = apply_rotation(x, y, &dims, rotation);
                    assert!(index < dims.buffer_size());
                    // bits 0..=5 of the last byte in a row are padding
                    if index % 16 == 15 {
                        assert!(bit >= 0x40);
                    }
                }
            }
        }
    }
}
