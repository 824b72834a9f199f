use image::{Rgb, RgbImage};

use super::font::{GLYPH_WIDTH, glyph};

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const GREY: Rgb<u8> = Rgb([200, 200, 200]);
pub const BLUE: Rgb<u8> = Rgb([31, 119, 180]);
pub const RED: Rgb<u8> = Rgb([214, 39, 40]);
pub const GREEN: Rgb<u8> = Rgb([0, 128, 0]);

/// Marker colours, cycled per point.
pub const PALETTE: [Rgb<u8>; 10] = [
    Rgb([31, 119, 180]),
    Rgb([255, 127, 14]),
    Rgb([44, 160, 44]),
    Rgb([214, 39, 40]),
    Rgb([148, 103, 189]),
    Rgb([140, 86, 75]),
    Rgb([227, 119, 194]),
    Rgb([127, 127, 127]),
    Rgb([188, 189, 34]),
    Rgb([23, 190, 207]),
];

pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, WHITE),
        }
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    pub fn blend(&mut self, x: i64, y: i64, color: Rgb<u8>, alpha: f32) {
        if x < 0 || y < 0 || x >= self.image.width() as i64 || y >= self.image.height() as i64 {
            return;
        }
        let px = self.image.get_pixel_mut(x as u32, y as u32);
        for (dst, src) in px.0.iter_mut().zip(color.0) {
            *dst = (f32::from(src) * alpha + f32::from(*dst) * (1.0 - alpha)).round() as u8;
        }
    }

    pub fn set(&mut self, x: i64, y: i64, color: Rgb<u8>) {
        self.blend(x, y, color, 1.0);
    }

    pub fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>, alpha: f32) {
        let (xa, xb) = (x0.min(x1), x0.max(x1));
        let (ya, yb) = (y0.min(y1), y0.max(y1));
        for y in ya..=yb {
            for x in xa..=xb {
                self.blend(x, y, color, alpha);
            }
        }
    }

    pub fn line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).max(1);
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let x = x0 as f64 + (x1 - x0) as f64 * t;
            let y = y0 as f64 + (y1 - y0) as f64 * t;
            let (x, y) = (x.round() as i64, y.round() as i64);
            self.set(x, y, color);
            self.set(x, y + 1, color);
        }
    }

    pub fn dot(&mut self, cx: i64, cy: i64, radius: i64, color: Rgb<u8>) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.set(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Draws `text` with its top-left corner at (x, y). Unknown characters
    /// are left blank.
    pub fn text(&mut self, x: i64, y: i64, text: &str, scale: u32, color: Rgb<u8>) {
        let scale = scale.max(1) as i64;
        let advance = (GLYPH_WIDTH as i64 + 1) * scale;
        for (i, c) in text.chars().enumerate() {
            let Some(rows) = glyph(c) else { continue };
            let ox = x + i as i64 * advance;
            for (row, bits) in rows.into_iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                        continue;
                    }
                    let px = ox + col as i64 * scale;
                    let py = y + row as i64 * scale;
                    self.fill_rect(px, py, px + scale - 1, py + scale - 1, color, 1.0);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_and_clip() {
        let mut canvas = Canvas::new(4, 4);
        canvas.blend(1, 1, BLACK, 0.5);
        canvas.set(-1, 10, BLACK);
        let image = canvas.into_image();
        assert_eq!(image.get_pixel(1, 1), &Rgb([128, 128, 128]));
        assert_eq!(image.get_pixel(0, 0), &WHITE);
    }

    #[test]
    fn test_line_reaches_both_ends() {
        let mut canvas = Canvas::new(10, 10);
        canvas.line(0, 0, 9, 5, RED);
        let image = canvas.into_image();
        assert_eq!(image.get_pixel(0, 0), &RED);
        assert_eq!(image.get_pixel(9, 5), &RED);
    }

    #[test]
    fn test_text_sets_glyph_pixels() {
        let mut canvas = Canvas::new(8, 8);
        canvas.text(0, 0, "1", 1, BLACK);
        let image = canvas.into_image();
        assert_eq!(image.get_pixel(1, 0), &BLACK);
        assert_eq!(image.get_pixel(0, 0), &WHITE);
        assert_eq!(image.get_pixel(0, 4), &BLACK);
    }
}
