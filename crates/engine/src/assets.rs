use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::animation::AnimationClip;
use crate::tilemap::TileKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("asset key must not be empty")]
    EmptyKey,
    #[error("asset key '{key}' contains invalid character '{character}'")]
    InvalidKeyCharacter { key: String, character: char },
    #[error("image '{key}' is not registered")]
    MissingImage { key: String },
    #[error("animation '{key}' is not registered")]
    MissingAnimation { key: String },
    #[error("animation has no frames")]
    EmptyAnimation,
    #[error("animation frame duration must be positive")]
    ZeroFrameDuration,
    #[error("sprite {width}x{height} needs {expected} bytes of rgba, got {actual}")]
    PixelBufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// RGBA8 image. Pixel data is shared, so clones are cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    width: u32,
    height: u32,
    rgba: Arc<[u8]>,
}

impl Sprite {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, AssetError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(AssetError::PixelBufferSize {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba: rgba.into(),
        })
    }

    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self::painted(width, height, |_, _| color)
    }

    pub fn painted(width: u32, height: u32, paint: impl Fn(u32, u32) -> [u8; 4]) -> Self {
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                rgba.extend_from_slice(&paint(x, y));
            }
        }
        Self {
            width,
            height,
            rgba: rgba.into(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let index = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.rgba[index],
            self.rgba[index + 1],
            self.rgba[index + 2],
            self.rgba[index + 3],
        ]
    }
}

/// Images and animation clips keyed by `"{type}"`, `"{category}/{variant}"`
/// or `"{entity}/{action}"`.
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    images: HashMap<String, Sprite>,
    variants: HashMap<String, Vec<Sprite>>,
    animations: HashMap<String, AnimationClip>,
}

impl AssetRegistry {
    pub fn insert_image(&mut self, key: &str, sprite: Sprite) -> Result<(), AssetError> {
        validate_asset_key(key)?;
        self.images.insert(key.to_string(), sprite);
        Ok(())
    }

    /// Registers a numbered image family reachable as `"{category}/{index}"`.
    pub fn insert_variants(
        &mut self,
        category: &str,
        sprites: Vec<Sprite>,
    ) -> Result<(), AssetError> {
        validate_asset_key(category)?;
        self.variants.insert(category.to_string(), sprites);
        Ok(())
    }

    pub fn insert_animation(&mut self, key: &str, clip: AnimationClip) -> Result<(), AssetError> {
        validate_asset_key(key)?;
        self.animations.insert(key.to_string(), clip);
        Ok(())
    }

    pub fn image(&self, key: &str) -> Result<&Sprite, AssetError> {
        if let Some(sprite) = self.images.get(key) {
            return Ok(sprite);
        }
        key.rsplit_once('/')
            .and_then(|(category, index)| {
                let index = index.parse::<usize>().ok()?;
                self.variant(category, index)
            })
            .ok_or_else(|| AssetError::MissingImage {
                key: key.to_string(),
            })
    }

    pub fn variant(&self, category: &str, index: usize) -> Option<&Sprite> {
        self.variants.get(category)?.get(index)
    }

    pub fn variants(&self, category: &str) -> &[Sprite] {
        self.variants.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn tile_image(&self, kind: TileKind, variant: u32) -> Option<&Sprite> {
        self.variant(kind.asset_category(), variant as usize)
    }

    pub fn animation(&self, key: &str) -> Result<&AnimationClip, AssetError> {
        self.animations
            .get(key)
            .ok_or_else(|| AssetError::MissingAnimation {
                key: key.to_string(),
            })
    }

    /// Procedurally drawn stand-ins for every asset the runtime asks for.
    pub fn placeholder() -> Self {
        let mut registry = Self::default();
        placeholder::populate(&mut registry);
        registry
    }
}

fn validate_asset_key(key: &str) -> Result<(), AssetError> {
    if key.is_empty() {
        return Err(AssetError::EmptyKey);
    }
    match key
        .chars()
        .find(|ch| !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/')))
    {
        Some(character) => Err(AssetError::InvalidKeyCharacter {
            key: key.to_string(),
            character,
        }),
        None => Ok(()),
    }
}

mod placeholder {
    use super::{AssetRegistry, Sprite};
    use crate::animation::AnimationClip;

    const CLEAR: [u8; 4] = [0, 0, 0, 0];
    const GRASS_TOP: [u8; 4] = [92, 170, 72, 255];
    const DIRT: [u8; 4] = [120, 84, 56, 255];
    const STONE: [u8; 4] = [118, 122, 132, 255];
    const STONE_DARK: [u8; 4] = [84, 88, 98, 255];
    const LEAF_GREEN: [u8; 4] = [60, 140, 70, 255];
    const TRUNK: [u8; 4] = [96, 64, 40, 255];
    const PLAYER_BODY: [u8; 4] = [28, 30, 46, 255];
    const PLAYER_SCARF: [u8; 4] = [210, 60, 60, 255];
    const ENEMY_BODY: [u8; 4] = [120, 40, 120, 255];
    const EYE: [u8; 4] = [240, 240, 240, 255];
    const WHITE: [u8; 4] = [255, 255, 255, 255];

    // Frame counts and durations match the shipped sprite sheets.
    const PLAYER_ANIMATIONS: [(&str, u32, u32); 4] =
        [("idle", 22, 6), ("run", 8, 4), ("jump", 1, 5), ("wall_slide", 1, 5)];
    const ENEMY_ANIMATIONS: [(&str, u32, u32); 2] = [("idle", 16, 6), ("run", 8, 4)];

    pub(super) fn populate(registry: &mut AssetRegistry) {
        let results = [
            registry.insert_variants("grass", (0..9).map(grass_tile).collect()),
            registry.insert_variants("stone", (0..9).map(stone_tile).collect()),
            registry.insert_variants("decor", (0..4).map(decor_tile).collect()),
            registry.insert_variants("large_decor", (0..3).map(large_decor).collect()),
            registry.insert_variants("spawners", (0..2).map(spawner_marker).collect()),
            registry.insert_variants("clouds", (0..2).map(cloud).collect()),
            registry.insert_image("background", background(320, 240)),
            registry.insert_image("gun", Sprite::solid(7, 4, [70, 70, 76, 255])),
            registry.insert_image("projectile", Sprite::solid(5, 2, [250, 240, 200, 255])),
        ];
        for result in results {
            debug_assert!(result.is_ok(), "placeholder keys are valid");
        }

        for (action, count, duration) in PLAYER_ANIMATIONS {
            insert_clip(
                registry,
                &format!("player/{action}"),
                (0..count).map(|i| actor_frame(PLAYER_BODY, PLAYER_SCARF, i)).collect(),
                duration,
                true,
            );
        }
        for (action, count, duration) in ENEMY_ANIMATIONS {
            insert_clip(
                registry,
                &format!("enemy/{action}"),
                (0..count).map(|i| actor_frame(ENEMY_BODY, EYE, i)).collect(),
                duration,
                true,
            );
        }
        insert_clip(
            registry,
            "particle/leaf",
            (0..18).map(leaf_frame).collect(),
            20,
            false,
        );
        insert_clip(
            registry,
            "particle/particle",
            (0..4).map(dust_frame).collect(),
            6,
            false,
        );
    }

    fn insert_clip(
        registry: &mut AssetRegistry,
        key: &str,
        frames: Vec<Sprite>,
        duration: u32,
        looping: bool,
    ) {
        let inserted = AnimationClip::new(frames, duration, looping)
            .and_then(|clip| registry.insert_animation(key, clip));
        debug_assert!(inserted.is_ok(), "placeholder clip '{key}' is valid");
    }

    fn grass_tile(variant: u32) -> Sprite {
        Sprite::painted(16, 16, move |x, y| {
            let top = 3 + (x + variant) % 3;
            if y < top {
                GRASS_TOP
            } else {
                DIRT
            }
        })
    }

    fn stone_tile(variant: u32) -> Sprite {
        Sprite::painted(16, 16, move |x, y| {
            if (x + y * 3 + variant) % 7 == 0 {
                STONE_DARK
            } else {
                STONE
            }
        })
    }

    fn decor_tile(variant: u32) -> Sprite {
        Sprite::painted(16, 16, move |x, y| {
            let stem = x == 7 + variant % 2 && y > 8;
            let bloom = y > 6 && y < 10 && x.abs_diff(7) < 2 + variant;
            if stem || bloom {
                LEAF_GREEN
            } else {
                CLEAR
            }
        })
    }

    fn large_decor(variant: u32) -> Sprite {
        match variant {
            2 => Sprite::painted(32, 46, |x, y| {
                let dx = x as i32 - 16;
                let dy = y as i32 - 14;
                if dx * dx + dy * dy < 196 {
                    LEAF_GREEN
                } else if y >= 24 && (13..19).contains(&x) {
                    TRUNK
                } else {
                    CLEAR
                }
            }),
            _ => Sprite::painted(24, 16, move |x, y| {
                if y > 4 + variant * 3 && x % 5 != 0 {
                    STONE_DARK
                } else {
                    CLEAR
                }
            }),
        }
    }

    fn spawner_marker(variant: u32) -> Sprite {
        let color = if variant == 0 { PLAYER_SCARF } else { ENEMY_BODY };
        Sprite::painted(16, 16, move |x, y| {
            if x == 0 || y == 0 || x == 15 || y == 15 {
                color
            } else {
                CLEAR
            }
        })
    }

    fn cloud(variant: u32) -> Sprite {
        let (w, h) = if variant == 0 { (48, 18) } else { (72, 26) };
        Sprite::painted(w, h, move |x, y| {
            let nx = (x as f32 - w as f32 * 0.5) / (w as f32 * 0.5);
            let ny = (y as f32 - h as f32 * 0.5) / (h as f32 * 0.5);
            if nx * nx + ny * ny <= 1.0 {
                [236, 244, 252, 200]
            } else {
                CLEAR
            }
        })
    }

    fn background(width: u32, height: u32) -> Sprite {
        Sprite::painted(width, height, move |_, y| {
            let t = y as f32 / height.max(1) as f32;
            [
                (14.0 + 60.0 * t) as u8,
                (180.0 + 40.0 * t) as u8,
                (236.0 + 12.0 * t) as u8,
                255,
            ]
        })
    }

    /// 14x18 frame: the 8x15 collision body sits at (3,3).
    fn actor_frame(body: [u8; 4], accent: [u8; 4], index: u32) -> Sprite {
        Sprite::painted(14, 18, move |x, y| {
            let in_body = (3..11).contains(&x) && (3..18).contains(&y);
            if !in_body {
                return CLEAR;
            }
            if y == 6 && (x == 8 || x == 9) {
                return accent;
            }
            let stride = index % 2;
            if y >= 15 && (x + stride) % 3 == 0 {
                return CLEAR;
            }
            body
        })
    }

    fn leaf_frame(index: u32) -> Sprite {
        Sprite::painted(3, 3, move |x, y| {
            if (x + y + index) % 2 == 0 {
                LEAF_GREEN
            } else {
                CLEAR
            }
        })
    }

    fn dust_frame(index: u32) -> Sprite {
        let size = 4 - index.min(3);
        Sprite::solid(size, size, WHITE)
    }
}
