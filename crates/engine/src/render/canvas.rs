use crate::assets::Sprite;
use crate::math::Vec2;

/// Coverage threshold used when building silhouettes.
const SILHOUETTE_ALPHA_THRESHOLD: u8 = 127;

/// Software RGBA8 surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let offset = self.offset(x, y);
        [
            self.rgba[offset],
            self.rgba[offset + 1],
            self.rgba[offset + 2],
            self.rgba[offset + 3],
        ]
    }

    pub fn clear(&mut self, color: [u8; 4]) {
        for pixel in self.rgba.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
    }

    /// Draws `sprite` with its top-left at (`x`, `y`), alpha blended and clipped.
    pub fn blit(&mut self, sprite: &Sprite, x: i32, y: i32, flip_x: bool) {
        let (sw, sh) = (sprite.width() as i32, sprite.height() as i32);
        let Some((left, top, right, bottom)) = self.clip_rect(x, y, sw, sh) else {
            return;
        };
        for dst_y in top..bottom {
            let src_y = (dst_y - y) as u32;
            for dst_x in left..right {
                let local_x = dst_x - x;
                let src_x = if flip_x { sw - 1 - local_x } else { local_x } as u32;
                self.blend(dst_x as u32, dst_y as u32, sprite.pixel(src_x, src_y));
            }
        }
    }

    /// Composites another canvas on top of this one.
    pub fn blit_canvas(&mut self, src: &Canvas, x: i32, y: i32) {
        let Some((left, top, right, bottom)) =
            self.clip_rect(x, y, src.width as i32, src.height as i32)
        else {
            return;
        };
        for dst_y in top..bottom {
            for dst_x in left..right {
                let color = src.pixel((dst_x - x) as u32, (dst_y - y) as u32);
                self.blend(dst_x as u32, dst_y as u32, color);
            }
        }
    }

    /// Scanline fill of a simple polygon, sampling at pixel centers.
    pub fn fill_polygon(&mut self, points: &[Vec2], color: [u8; 4]) {
        if points.len() < 3 || self.width == 0 || self.height == 0 {
            return;
        }
        let min_y = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_y = points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        let first_row = (min_y.floor() as i32).max(0);
        let last_row = (max_y.ceil() as i32).min(self.height as i32 - 1);

        let mut crossings = Vec::with_capacity(points.len());
        for row in first_row..=last_row {
            let sample_y = row as f32 + 0.5;
            crossings.clear();
            for (index, a) in points.iter().enumerate() {
                let b = points[(index + 1) % points.len()];
                if (a.y <= sample_y && b.y > sample_y) || (b.y <= sample_y && a.y > sample_y) {
                    let t = (sample_y - a.y) / (b.y - a.y);
                    crossings.push(a.x + t * (b.x - a.x));
                }
            }
            crossings.sort_by(f32::total_cmp);
            for span in crossings.chunks_exact(2) {
                let start = ((span[0] - 0.5).ceil() as i32).max(0);
                let end = ((span[1] - 0.5).ceil() as i32).min(self.width as i32);
                for x in start..end {
                    self.blend(x as u32, row as u32, color);
                }
            }
        }
    }

    /// Stamps a flat-colored copy of `src`'s opaque coverage at an offset.
    pub fn stamp_silhouette(&mut self, src: &Canvas, dx: i32, dy: i32, color: [u8; 4]) {
        let Some((left, top, right, bottom)) =
            self.clip_rect(dx, dy, src.width as i32, src.height as i32)
        else {
            return;
        };
        for dst_y in top..bottom {
            for dst_x in left..right {
                let coverage = src.pixel((dst_x - dx) as u32, (dst_y - dy) as u32)[3];
                if coverage > SILHOUETTE_ALPHA_THRESHOLD {
                    self.blend(dst_x as u32, dst_y as u32, color);
                }
            }
        }
    }

    /// Paints every pixel whose center lies outside the circle.
    pub fn fill_outside_circle(&mut self, center: Vec2, radius: f32, color: [u8; 4]) {
        let radius_sq = radius.max(0.0).powi(2);
        for y in 0..self.height {
            let dy = y as f32 + 0.5 - center.y;
            for x in 0..self.width {
                let dx = x as f32 + 0.5 - center.x;
                if dx * dx + dy * dy > radius_sq {
                    let offset = self.offset(x, y);
                    self.rgba[offset..offset + 4].copy_from_slice(&color);
                }
            }
        }
    }

    /// Copies this canvas into a same-sized frame buffer shifted by `offset`;
    /// uncovered pixels become opaque black.
    pub fn copy_to_frame(&self, frame: &mut [u8], offset: (i32, i32)) {
        let expected = self.rgba.len();
        if frame.len() < expected {
            return;
        }
        for pixel in frame[..expected].chunks_exact_mut(4) {
            pixel.copy_from_slice(&[0, 0, 0, 255]);
        }
        let Some((left, top, right, bottom)) =
            self.clip_rect(offset.0, offset.1, self.width as i32, self.height as i32)
        else {
            return;
        };
        let row_bytes = (right - left) as usize * 4;
        for dst_y in top..bottom {
            let src = self.offset((left - offset.0) as u32, (dst_y - offset.1) as u32);
            let dst = self.offset(left as u32, dst_y as u32);
            frame[dst..dst + row_bytes].copy_from_slice(&self.rgba[src..src + row_bytes]);
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    fn clip_rect(&self, x: i32, y: i32, w: i32, h: i32) -> Option<(i32, i32, i32, i32)> {
        let left = x.max(0);
        let top = y.max(0);
        let right = (x + w).min(self.width as i32);
        let bottom = (y + h).min(self.height as i32);
        (left < right && top < bottom).then_some((left, top, right, bottom))
    }

    fn blend(&mut self, x: u32, y: u32, src: [u8; 4]) {
        let alpha = src[3] as u32;
        if alpha == 0 {
            return;
        }
        let offset = self.offset(x, y);
        let dst = &mut self.rgba[offset..offset + 4];
        if alpha == 255 {
            dst.copy_from_slice(&src);
            return;
        }
        let inverse = 255 - alpha;
        for channel in 0..3 {
            dst[channel] =
                ((src[channel] as u32 * alpha + dst[channel] as u32 * inverse + 127) / 255) as u8;
        }
        dst[3] = (alpha + (dst[3] as u32 * inverse + 127) / 255) as u8;
    }
}
