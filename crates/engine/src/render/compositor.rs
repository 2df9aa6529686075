use std::collections::HashSet;

use tracing::warn;

use super::canvas::Canvas;
use crate::actors::SPRITE_OFFSET;
use crate::assets::Sprite;
use crate::math::Vec2;
use crate::scene::{Scene, TRANSITION_SPAN};

const SKY: [u8; 4] = [14, 17, 41, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];
const BLACK: [u8; 4] = [0, 0, 0, 255];
const SPARK_COLOR: [u8; 4] = [255, 255, 255, 255];
const OUTLINE_COLOR: [u8; 4] = [0, 0, 0, 180];
const OUTLINE_OFFSETS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const IRIS_SCALE: f32 = 8.0;

/// Builds a display-sized frame from a [`Scene`] using two layers: `back`
/// for the sky and outline, `front` for everything that gets outlined.
pub struct Compositor {
    back: Canvas,
    front: Canvas,
    warned_missing_sprite_keys: HashSet<String>,
}

impl Compositor {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            back: Canvas::new(width, height),
            front: Canvas::new(width, height),
            warned_missing_sprite_keys: HashSet::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.back.width()
    }

    pub fn height(&self) -> u32 {
        self.back.height()
    }

    /// Composited result of the last [`Compositor::render`], before shake.
    pub fn output(&self) -> &Canvas {
        &self.back
    }

    pub fn render(&mut self, scene: &Scene) {
        let view = (self.width(), self.height());
        let scroll = scene.render_scroll();
        let assets = scene.assets();
        let warned = &mut self.warned_missing_sprite_keys;

        self.back.clear(SKY);
        match assets.image("background") {
            Ok(background) => self.back.blit(background, 0, 0, false),
            Err(_) => warn_missing_sprite_once(warned, "background"),
        }
        for cloud in scene.clouds().iter() {
            let Some(sprite) = assets.variant("clouds", cloud.variant) else {
                warn_missing_sprite_once(warned, &format!("clouds/{}", cloud.variant));
                continue;
            };
            let pos = cloud.screen_pos(scroll, view, (sprite.width(), sprite.height()));
            draw_at(&mut self.back, sprite, pos, false);
        }

        self.front.clear(CLEAR);
        let tiles = scene.tiles();
        for tile in tiles.offgrid() {
            match assets.tile_image(tile.kind, tile.variant) {
                Some(sprite) => draw_at(&mut self.front, sprite, tile.pos - scroll, false),
                None => warn_missing_sprite_once(
                    warned,
                    &format!("{}/{}", tile.kind.asset_category(), tile.variant),
                ),
            }
        }
        for cell in tiles.visible_cells(scroll, view) {
            let Some(tile) = tiles.get(cell) else {
                continue;
            };
            match assets.tile_image(tile.kind, tile.variant) {
                Some(sprite) => {
                    let pos = tile.pos.to_pixel(tiles.tile_size()) - scroll;
                    draw_at(&mut self.front, sprite, pos, false);
                }
                None => warn_missing_sprite_once(
                    warned,
                    &format!("{}/{}", tile.kind.asset_category(), tile.variant),
                ),
            }
        }

        let gun = assets.image("gun").ok();
        if gun.is_none() && !scene.enemies().is_empty() {
            warn_missing_sprite_once(warned, "gun");
        }
        for enemy in scene.enemies() {
            let flip = enemy.body.flip;
            draw_at(
                &mut self.front,
                enemy.current_image(),
                enemy.body.pos + SPRITE_OFFSET - scroll,
                flip,
            );
            if let Some(gun) = gun {
                let pos = enemy.gun_position(gun.width()) - scroll;
                draw_at(&mut self.front, gun, pos, flip);
            }
        }

        let player = scene.player();
        if !scene.is_player_dead() && player.is_visible() {
            draw_at(
                &mut self.front,
                player.current_image(),
                player.body.pos + SPRITE_OFFSET - scroll,
                player.body.flip,
            );
        }

        match assets.image("projectile") {
            Ok(sprite) => {
                for projectile in scene.projectiles() {
                    draw_centered(&mut self.front, sprite, projectile.pos - scroll);
                }
            }
            Err(_) if !scene.projectiles().is_empty() => {
                warn_missing_sprite_once(warned, "projectile");
            }
            Err(_) => {}
        }

        for spark in scene.sparks() {
            self.front.fill_polygon(&spark.points(scroll), SPARK_COLOR);
        }

        for (dx, dy) in OUTLINE_OFFSETS {
            self.back
                .stamp_silhouette(&self.front, dx, dy, OUTLINE_COLOR);
        }

        for particle in scene.particles() {
            draw_centered(
                &mut self.front,
                particle.animation().current_image(),
                particle.pos - scroll,
            );
        }

        let transition = scene.transition();
        if transition != 0 {
            let center = Vec2::new(view.0 as f32 / 2.0, view.1 as f32 / 2.0);
            let radius = (TRANSITION_SPAN - transition.abs()) as f32 * IRIS_SCALE;
            self.front.fill_outside_circle(center, radius, BLACK);
        }

        self.back.blit_canvas(&self.front, 0, 0);
    }

    /// Copies the composited image into an RGBA frame of the same size,
    /// shifted by the scene's current screen shake.
    pub fn write_frame(&self, scene: &Scene, frame: &mut [u8]) {
        let shake = scene.shake_offset();
        self.back
            .copy_to_frame(frame, (shake.x.round() as i32, shake.y.round() as i32));
    }
}

fn draw_at(canvas: &mut Canvas, sprite: &Sprite, pos: Vec2, flip_x: bool) {
    canvas.blit(sprite, pos.x.floor() as i32, pos.y.floor() as i32, flip_x);
}

fn draw_centered(canvas: &mut Canvas, sprite: &Sprite, center: Vec2) {
    let half = Vec2::new(sprite.width() as f32 / 2.0, sprite.height() as f32 / 2.0);
    draw_at(canvas, sprite, center - half, false);
}

fn warn_missing_sprite_once(warned_keys: &mut HashSet<String>, key: &str) {
    if !warned_keys.insert(key.to_string()) {
        return;
    }
    warn!(sprite_key = key, "sprite_missing");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetRegistry;
    use crate::input::TickInput;
    use crate::level::LevelFile;
    use crate::math::GridPos;
    use crate::scene::SceneConfig;
    use crate::tilemap::{Tile, TileKind, TileMap};

    fn scene_with(assets: AssetRegistry) -> Scene {
        let mut map = TileMap::new(16);
        for x in 0..20 {
            map.insert(Tile::new(TileKind::Grass, 0, GridPos::new(x, 10)));
        }
        map.insert(Tile::new(TileKind::Spawner, 0, GridPos::new(3, 9)));
        map.insert(Tile::new(TileKind::Spawner, 1, GridPos::new(12, 9)));
        Scene::new(
            SceneConfig::default(),
            vec![LevelFile::from_tilemap(&map)],
            assets,
        )
        .expect("scene")
    }

    #[test]
    fn iris_blacks_out_corners_after_load() {
        let scene = scene_with(AssetRegistry::placeholder());
        let mut compositor = Compositor::new(320, 240);

        compositor.render(&scene);

        assert_eq!(scene.transition(), -TRANSITION_SPAN);
        assert_eq!(compositor.output().pixel(0, 0), BLACK);
        assert_eq!(compositor.output().pixel(160, 120), BLACK);
    }

    #[test]
    fn open_iris_shows_the_level() {
        let mut scene = scene_with(AssetRegistry::placeholder());
        for _ in 0..TRANSITION_SPAN {
            scene.tick(&TickInput::default());
        }
        assert_eq!(scene.transition(), 0);
        let mut compositor = Compositor::new(320, 240);

        compositor.render(&scene);

        let output = compositor.output();
        let opaque = output
            .rgba()
            .chunks_exact(4)
            .filter(|pixel| pixel[3] == 255)
            .count();
        assert_eq!(opaque, 320 * 240);
        let non_black = output
            .rgba()
            .chunks_exact(4)
            .filter(|pixel| pixel[..3] != [0, 0, 0])
            .count();
        assert!(non_black > 0);
    }

    #[test]
    fn missing_sprites_are_skipped_and_warned_once() {
        let scene = scene_with(AssetRegistry::placeholder());
        let mut compositor = Compositor::new(320, 240);
        compositor
            .warned_missing_sprite_keys
            .insert("already".to_string());

        warn_missing_sprite_once(&mut compositor.warned_missing_sprite_keys, "gun");
        warn_missing_sprite_once(&mut compositor.warned_missing_sprite_keys, "gun");
        compositor.render(&scene);

        assert_eq!(compositor.warned_missing_sprite_keys.len(), 2);
    }

    #[test]
    fn frame_is_filled_at_display_size() {
        let scene = scene_with(AssetRegistry::placeholder());
        let mut compositor = Compositor::new(320, 240);
        compositor.render(&scene);
        let mut frame = vec![7u8; 320 * 240 * 4];

        compositor.write_frame(&scene, &mut frame);

        assert_eq!(scene.shake_offset(), Vec2::ZERO);
        assert_eq!(&frame[..], compositor.output().rgba());
    }
}
