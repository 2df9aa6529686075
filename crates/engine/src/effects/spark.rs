use std::f32::consts::{FRAC_PI_2, PI};

use crate::math::Vec2;

const SPEED_DECAY: f32 = 0.1;

/// Short-lived streak that slows to a stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spark {
    pub pos: Vec2,
    pub angle: f32,
    pub speed: f32,
}

impl Spark {
    pub fn new(pos: Vec2, angle: f32, speed: f32) -> Self {
        Self { pos, angle, speed }
    }

    /// Returns `true` once the spark has stopped.
    pub fn update(&mut self) -> bool {
        self.pos += Vec2::from_angle(self.angle, self.speed);
        self.speed = (self.speed - SPEED_DECAY).max(0.0);
        self.speed == 0.0
    }

    /// Diamond outline in screen space: long tips along the direction of
    /// travel, short tips across it.
    pub fn points(&self, offset: Vec2) -> [Vec2; 4] {
        let origin = self.pos - offset;
        let long = self.speed * 3.0;
        let short = self.speed * 0.5;
        [
            origin + Vec2::from_angle(self.angle, long),
            origin + Vec2::from_angle(self.angle - FRAC_PI_2, short),
            origin + Vec2::from_angle(self.angle - PI, long),
            origin + Vec2::from_angle(self.angle - PI * 1.5, short),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slows_down_and_expires() {
        let mut spark = Spark::new(Vec2::ZERO, 0.0, 0.35);
        assert!(!spark.update());
        assert!((spark.pos.x - 0.35).abs() < 1e-6);
        assert!(!spark.update());
        assert!(!spark.update());
        assert!(spark.update());
        assert_eq!(spark.speed, 0.0);
    }

    #[test]
    fn diamond_is_symmetric_about_its_center() {
        let spark = Spark::new(Vec2::new(10.0, 10.0), 0.7, 2.0);
        let [a, b, c, d] = spark.points(Vec2::new(4.0, 4.0));
        let center = Vec2::new(6.0, 6.0);
        for (p, q) in [(a, c), (b, d)] {
            let mid = Vec2::new((p.x + q.x) * 0.5, (p.y + q.y) * 0.5);
            assert!((mid.x - center.x).abs() < 1e-4, "mid={mid:?}");
            assert!((mid.y - center.y).abs() < 1e-4, "mid={mid:?}");
        }
        let long = ((a.x - c.x).powi(2) + (a.y - c.y).powi(2)).sqrt();
        let short = ((b.x - d.x).powi(2) + (b.y - d.y).powi(2)).sqrt();
        assert!((long - 12.0).abs() < 1e-4);
        assert!((short - 2.0).abs() < 1e-4);
    }
}
