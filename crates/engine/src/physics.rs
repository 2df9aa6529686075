use crate::math::{Rect, Vec2};
use crate::tilemap::TileMap;

pub const GRAVITY: f32 = 0.4;
pub const TERMINAL_VELOCITY: f32 = 12.0;

/// Contact flags from the most recent [`Body::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Collisions {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Collisions {
    pub fn horizontal(&self) -> bool {
        self.left || self.right
    }
}

/// Axis-aligned physics body shared by every actor type.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub size: Vec2,
    pub velocity: Vec2,
    pub collisions: Collisions,
    /// `true` while facing left.
    pub flip: bool,
    pub last_movement: Vec2,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            size,
            velocity: Vec2::ZERO,
            collisions: Collisions::default(),
            flip: false,
            last_movement: Vec2::ZERO,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.rect().center()
    }

    /// Advances one tick: gravity, then an X pass and a Y pass against nearby
    /// solid tiles. When several solids overlap the last one in the
    /// neighbourhood order decides the final edge.
    pub fn step(&mut self, tiles: &TileMap, movement: Vec2) {
        self.collisions = Collisions::default();
        self.velocity.y = (self.velocity.y + GRAVITY).min(TERMINAL_VELOCITY);

        let frame_movement = movement + self.velocity;

        self.pos.x += frame_movement.x;
        let mut rect = self.rect();
        for solid in tiles.solid_rects_around(self.pos) {
            if !rect.overlaps(&solid) {
                continue;
            }
            if frame_movement.x > 0.0 {
                rect.set_right(solid.left());
                self.collisions.right = true;
            }
            if frame_movement.x < 0.0 {
                rect.set_left(solid.right());
                self.collisions.left = true;
            }
            self.pos.x = rect.x;
        }

        self.pos.y += frame_movement.y;
        let mut rect = self.rect();
        for solid in tiles.solid_rects_around(self.pos) {
            if !rect.overlaps(&solid) {
                continue;
            }
            if frame_movement.y > 0.0 {
                rect.set_bottom(solid.top());
                self.collisions.down = true;
            }
            if frame_movement.y < 0.0 {
                rect.set_top(solid.bottom());
                self.collisions.up = true;
            }
            self.pos.y = rect.y;
        }

        if movement.x > 0.0 {
            self.flip = false;
        }
        if movement.x < 0.0 {
            self.flip = true;
        }
        self.last_movement = movement;

        if self.collisions.up || self.collisions.down {
            self.velocity.y = 0.0;
        }
        if self.collisions.left || self.collisions.right {
            self.velocity.x = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::GridPos;
    use crate::tilemap::{Tile, TileKind};

    fn floor_and_wall() -> TileMap {
        let mut map = TileMap::new(16);
        for x in 0..8 {
            map.insert(Tile::new(TileKind::Grass, 0, GridPos::new(x, 10)));
        }
        for y in 6..10 {
            map.insert(Tile::new(TileKind::Stone, 0, GridPos::new(6, y)));
        }
        map
    }

    fn player_body(x: f32, y: f32) -> Body {
        Body::new(Vec2::new(x, y), Vec2::new(8.0, 15.0))
    }

    #[test]
    fn resting_body_stays_put_and_reports_ground() {
        let map = floor_and_wall();
        let mut body = player_body(20.0, 145.0);

        body.step(&map, Vec2::ZERO);

        assert_eq!(body.pos.y, 145.0);
        assert_eq!(body.velocity.y, 0.0);
        assert!(body.collisions.down);
        assert!(!body.collisions.horizontal());
    }

    #[test]
    fn body_above_floor_settles_flush_and_stays() {
        let map = floor_and_wall();
        let mut body = player_body(20.0, 144.0);

        for _ in 0..4 {
            body.step(&map, Vec2::ZERO);
        }
        assert_eq!(body.rect().bottom(), 160.0);
        assert!(body.collisions.down);

        for _ in 0..10 {
            body.step(&map, Vec2::ZERO);
            assert_eq!(body.rect().bottom(), 160.0);
        }
    }

    #[test]
    fn horizontal_hit_stops_flush_at_any_speed() {
        let map = floor_and_wall();
        for speed in [3.0, 5.0, 7.5] {
            let mut body = player_body(86.0, 145.0);
            body.velocity.x = speed;

            body.step(&map, Vec2::ZERO);

            assert_eq!(body.rect().right(), 96.0, "speed={speed}");
            assert!(body.collisions.right);
            assert_eq!(body.velocity.x, 0.0);
        }
    }

    #[test]
    fn moving_left_into_wall_sets_left_flag() {
        let map = floor_and_wall();
        let mut body = player_body(113.0, 145.0);

        body.step(&map, Vec2::new(-2.0, 0.0));

        assert_eq!(body.pos.x, 112.0);
        assert!(body.collisions.left);
        assert!(body.flip);
    }

    #[test]
    fn ceiling_hit_sets_up_and_zeroes_vertical_velocity() {
        let mut map = TileMap::new(16);
        map.insert(Tile::new(TileKind::Stone, 0, GridPos::new(1, 0)));
        let mut body = player_body(20.0, 18.0);
        body.velocity.y = -6.0;

        body.step(&map, Vec2::ZERO);

        assert_eq!(body.pos.y, 16.0);
        assert!(body.collisions.up);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn fall_speed_is_capped() {
        let map = TileMap::new(16);
        let mut body = player_body(0.0, 0.0);
        for _ in 0..100 {
            body.step(&map, Vec2::ZERO);
        }
        assert_eq!(body.velocity.y, TERMINAL_VELOCITY);
    }

    #[test]
    fn facing_is_sticky_without_horizontal_intent() {
        let map = TileMap::new(16);
        let mut body = player_body(0.0, 0.0);
        body.step(&map, Vec2::new(-1.0, 0.0));
        assert!(body.flip);
        body.step(&map, Vec2::ZERO);
        assert!(body.flip);
        assert_eq!(body.last_movement, Vec2::ZERO);
        body.step(&map, Vec2::new(1.0, 0.0));
        assert!(!body.flip);
    }

    #[test]
    fn decorations_do_not_block() {
        let mut map = TileMap::new(16);
        map.insert(Tile::new(TileKind::Decoration, 0, GridPos::new(1, 10)));
        let mut body = player_body(20.0, 145.0);
        body.step(&map, Vec2::ZERO);
        assert!(!body.collisions.down);
        assert!(body.pos.y > 145.0);
    }
}
