//! Owned RGBA framebuffer with bounds-checked 2D pixel access.
//!
//! All drawing operations clip against the buffer edges instead of failing:
//! off-screen geometry is expected in a renderer inner loop, not exceptional.
//! Alpha is fixed at 255 since compositing is opaque-only.

use crate::math::vec2::Vec2;

/// A width × height RGBA pixel array the render passes draw into.
///
/// The host presents the buffer by blitting [`PixelBuffer::as_bytes`] to a
/// display surface; the buffer itself never touches the windowing layer.
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width * height * 4) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Writes one pixel. Out-of-range coordinates are silently ignored.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, red: u8, green: u8, blue: u8) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            let index = ((y as u32 * self.width + x as u32) * 4) as usize;
            self.data[index] = red;
            self.data[index + 1] = green;
            self.data[index + 2] = blue;
            self.data[index + 3] = 255;
        }
    }

    /// Returns the color at (x, y), or None if out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<(u8, u8, u8)> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            let index = ((y as u32 * self.width + x as u32) * 4) as usize;
            Some((self.data[index], self.data[index + 1], self.data[index + 2]))
        } else {
            None
        }
    }

    pub fn clear(&mut self, red: u8, green: u8, blue: u8) {
        for pixel in self.data.chunks_exact_mut(4) {
            pixel[0] = red;
            pixel[1] = green;
            pixel[2] = blue;
            pixel[3] = 255;
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, red: u8, green: u8, blue: u8) {
        for dy in 0..height {
            for dx in 0..width {
                self.set_pixel(x + dx, y + dy, red, green, blue);
            }
        }
    }

    /// Draws a line between two points by stepping the major axis one pixel
    /// at a time and accumulating the minor axis by the slope ratio.
    ///
    /// Endpoints are truncated to integers and swapped so iteration always
    /// proceeds in increasing major-axis order.
    pub fn draw_line(&mut self, p1: Vec2, p2: Vec2, red: u8, green: u8, blue: u8) {
        let mut x1 = p1.x as i32;
        let mut y1 = p1.y as i32;
        let mut x2 = p2.x as i32;
        let mut y2 = p2.y as i32;

        let dx = (x2 - x1) as f32;
        let dy = (y2 - y1) as f32;

        if dx.abs() > dy.abs() {
            if x1 > x2 {
                std::mem::swap(&mut x1, &mut x2);
                std::mem::swap(&mut y1, &mut y2);
            }
            let slope = dy / dx;
            let mut y = y1 as f32;
            for x in x1..x2 {
                self.set_pixel(x, y as i32, red, green, blue);
                y += slope;
            }
        } else {
            if y1 > y2 {
                std::mem::swap(&mut x1, &mut x2);
                std::mem::swap(&mut y1, &mut y2);
            }
            let slope = dx / dy;
            let mut x = x1 as f32;
            for y in y1..y2 {
                self.set_pixel(x as i32, y, red, green, blue);
                x += slope;
            }
        }
    }

    fn eight_way_plot(&mut self, cx: i32, cy: i32, x: i32, y: i32, red: u8, green: u8, blue: u8) {
        self.set_pixel(cx + x, cy + y, red, green, blue);
        self.set_pixel(cx - x, cy + y, red, green, blue);
        self.set_pixel(cx + x, cy - y, red, green, blue);
        self.set_pixel(cx - x, cy - y, red, green, blue);
        self.set_pixel(cx + y, cy + x, red, green, blue);
        self.set_pixel(cx - y, cy + x, red, green, blue);
        self.set_pixel(cx + y, cy - x, red, green, blue);
        self.set_pixel(cx - y, cy - x, red, green, blue);
    }

    /// Midpoint circle algorithm with eight-way symmetric plotting.
    pub fn draw_circle_outline(&mut self, cx: i32, cy: i32, radius: i32, red: u8, green: u8, blue: u8) {
        let mut x = 0;
        let mut y = radius;
        let mut d = 3 - 2 * radius;
        self.eight_way_plot(cx, cy, x, y, red, green, blue);
        while y >= x {
            x += 1;
            if d > 0 {
                y -= 1;
                d += 4 * (x - y) + 10;
            } else {
                d += 4 * x + 6;
            }
            self.eight_way_plot(cx, cy, x, y, red, green, blue);
        }
    }

    /// Fills a circle one vertical span per x-offset.
    pub fn draw_filled_circle(&mut self, cx: i32, cy: i32, radius: i32, red: u8, green: u8, blue: u8) {
        for x in -radius..=radius {
            let half_height = ((radius * radius - x * x) as f32).sqrt() as i32;
            for y in (cy - half_height)..=(cy + half_height) {
                self.set_pixel(cx + x, y, red, green, blue);
            }
        }
    }

    /// The raw RGBA bytes, row-major, for presentation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut buffer = PixelBuffer::new(4, 4);
        buffer.set_pixel(-1, 0, 255, 0, 0);
        buffer.set_pixel(0, -1, 255, 0, 0);
        buffer.set_pixel(4, 0, 255, 0, 0);
        buffer.set_pixel(0, 4, 255, 0, 0);
        assert!(buffer.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn set_pixel_writes_opaque_rgba() {
        let mut buffer = PixelBuffer::new(4, 4);
        buffer.set_pixel(1, 2, 10, 20, 30);
        assert_eq!(buffer.get_pixel(1, 2), Some((10, 20, 30)));
        assert_eq!(buffer.as_bytes()[(2 * 4 + 1) * 4 + 3], 255);
    }

    #[test]
    fn fill_rect_clips_against_edges() {
        let mut buffer = PixelBuffer::new(4, 4);
        buffer.fill_rect(2, 2, 10, 10, 9, 9, 9);
        assert_eq!(buffer.get_pixel(3, 3), Some((9, 9, 9)));
        assert_eq!(buffer.get_pixel(1, 1), Some((0, 0, 0)));
    }

    #[test]
    fn horizontal_line_covers_major_axis() {
        let mut buffer = PixelBuffer::new(8, 8);
        buffer.draw_line(Vec2::new(1.0, 3.0), Vec2::new(6.0, 3.0), 255, 255, 255);
        for x in 1..6 {
            assert_eq!(buffer.get_pixel(x, 3), Some((255, 255, 255)));
        }
    }

    #[test]
    fn line_direction_does_not_matter() {
        let mut forward = PixelBuffer::new(16, 16);
        let mut backward = PixelBuffer::new(16, 16);
        forward.draw_line(Vec2::new(2.0, 2.0), Vec2::new(12.0, 7.0), 1, 2, 3);
        backward.draw_line(Vec2::new(12.0, 7.0), Vec2::new(2.0, 2.0), 1, 2, 3);
        assert_eq!(forward.as_bytes(), backward.as_bytes());
    }

    #[test]
    fn filled_circle_covers_center_and_extremes() {
        let mut buffer = PixelBuffer::new(16, 16);
        buffer.draw_filled_circle(8, 8, 3, 5, 5, 5);
        assert_eq!(buffer.get_pixel(8, 8), Some((5, 5, 5)));
        assert_eq!(buffer.get_pixel(5, 8), Some((5, 5, 5)));
        assert_eq!(buffer.get_pixel(11, 8), Some((5, 5, 5)));
        assert_eq!(buffer.get_pixel(12, 8), Some((0, 0, 0)));
    }

    #[test]
    fn circle_outline_leaves_interior_empty() {
        let mut buffer = PixelBuffer::new(16, 16);
        buffer.draw_circle_outline(8, 8, 4, 5, 5, 5);
        assert_eq!(buffer.get_pixel(8, 4), Some((5, 5, 5)));
        assert_eq!(buffer.get_pixel(12, 8), Some((5, 5, 5)));
        assert_eq!(buffer.get_pixel(8, 8), Some((0, 0, 0)));
    }
}
