//! Bitmap text primitive
//!
//! Draws device metadata using the fixed 8x8 glyph set scaled up by an
//! integer factor. Bitmap glyphs keep panel rasters byte-identical across
//! runs and platforms, which the archive reproducibility guarantee needs.

use font8x8::legacy::BASIC_LEGACY;
use image::{Rgba, RgbaImage};

/// Glyph cell size before scaling
const GLYPH_SIZE: u32 = 8;

/// Pixel width of a rendered string
pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_SIZE * scale
}

/// Pixel height of a rendered line
pub fn text_height(scale: u32) -> u32 {
    GLYPH_SIZE * scale
}

/// Draws one line of text at (x, y) = top-left. Characters outside the basic
/// ASCII range render as blanks; pixels outside the canvas are clipped.
pub fn draw_text(canvas: &mut RgbaImage, text: &str, x: i32, y: i32, scale: u32, color: Rgba<u8>) {
    let (width, height) = canvas.dimensions();
    for (index, ch) in text.chars().enumerate() {
        let glyph = match BASIC_LEGACY.get(ch as usize) {
            Some(glyph) => glyph,
            None => continue,
        };
        let glyph_x = x + (index as u32 * GLYPH_SIZE * scale) as i32;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                if bits & (1 << col) == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        let px = glyph_x + (col * scale + dx) as i32;
                        let py = y + (row as u32 * scale + dy) as i32;
                        if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
                            canvas.put_pixel(px as u32, py as u32, color);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("abc", 2), 3 * 8 * 2);
        assert_eq!(text_width("", 6), 0);
    }

    #[test]
    fn test_draw_is_deterministic() {
        let mut a = RgbaImage::new(100, 20);
        let mut b = RgbaImage::new(100, 20);
        draw_text(&mut a, "Acme", 2, 2, 2, WHITE);
        draw_text(&mut b, "Acme", 2, 2, 2, WHITE);
        assert_eq!(a.as_raw(), b.as_raw());
        // something was actually drawn
        assert!(a.pixels().any(|p| p.0[3] != 0));
    }

    #[test]
    fn test_clipping_does_not_panic() {
        let mut canvas = RgbaImage::new(10, 10);
        draw_text(&mut canvas, "clipped well outside", -50, -50, 4, WHITE);
        draw_text(&mut canvas, "x", 8, 8, 4, WHITE);
    }
}
