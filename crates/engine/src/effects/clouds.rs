use rand::Rng;

use crate::math::Vec2;

/// Parallax background cloud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cloud {
    pub pos: Vec2,
    pub variant: usize,
    pub speed: f32,
    pub depth: f32,
}

impl Cloud {
    pub fn update(&mut self) {
        self.pos.x += self.speed;
    }

    /// Top-left draw position for a `sprite_size` image on a `view_size`
    /// surface. Clouds wrap so the sky never runs out.
    pub fn screen_pos(&self, offset: Vec2, view_size: (u32, u32), sprite_size: (u32, u32)) -> Vec2 {
        let x = self.pos.x - offset.x * self.depth;
        let y = self.pos.y - offset.y * self.depth;
        let span_x = (view_size.0 + sprite_size.0) as f32;
        let span_y = (view_size.1 + sprite_size.1) as f32;
        Vec2::new(
            x.rem_euclid(span_x) - sprite_size.0 as f32,
            y.rem_euclid(span_y) - sprite_size.1 as f32,
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct Clouds {
    clouds: Vec<Cloud>,
}

impl Clouds {
    /// Scatters `count` clouds, ordered far to near so nearer ones draw on top.
    pub fn new<R: Rng + ?Sized>(count: usize, variant_count: usize, rng: &mut R) -> Self {
        let mut clouds = (0..count)
            .map(|_| Cloud {
                pos: Vec2::new(rng.random::<f32>() * 99_999.0, rng.random::<f32>() * 99_999.0),
                variant: if variant_count == 0 {
                    0
                } else {
                    rng.random_range(0..variant_count)
                },
                speed: rng.random::<f32>() * 0.05 + 0.05,
                depth: rng.random::<f32>() * 0.6 + 0.2,
            })
            .collect::<Vec<_>>();
        clouds.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        Self { clouds }
    }

    pub fn update(&mut self) {
        for cloud in &mut self.clouds {
            cloud.update();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cloud> {
        self.clouds.iter()
    }

    pub fn len(&self) -> usize {
        self.clouds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clouds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn clouds_are_sorted_by_depth_within_ranges() {
        let mut rng = StdRng::seed_from_u64(11);
        let clouds = Clouds::new(16, 2, &mut rng);
        assert_eq!(clouds.len(), 16);
        let depths = clouds.iter().map(|c| c.depth).collect::<Vec<_>>();
        assert!(depths.windows(2).all(|w| w[0] <= w[1]));
        for cloud in clouds.iter() {
            assert!((0.2..=0.8).contains(&cloud.depth));
            assert!((0.05..=0.1).contains(&cloud.speed));
            assert!(cloud.variant < 2);
        }
    }

    #[test]
    fn screen_position_wraps_into_view() {
        let cloud = Cloud {
            pos: Vec2::new(1000.0, -50.0),
            variant: 0,
            speed: 0.05,
            depth: 0.5,
        };
        let pos = cloud.screen_pos(Vec2::new(200.0, 0.0), (320, 240), (48, 18));
        // 1000 - 100 = 900; 900 mod 368 = 164
        assert!((pos.x - 116.0).abs() < 1e-3);
        // -50 mod 258 = 208
        assert!((pos.y - 190.0).abs() < 1e-3);
    }
}
