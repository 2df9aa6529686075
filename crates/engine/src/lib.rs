pub mod actors;
pub mod animation;
pub mod assets;
pub mod effects;
pub mod events;
pub mod input;
pub mod level;
pub mod math;
pub mod physics;
pub mod render;
pub mod scene;
pub mod tilemap;

pub use actors::{Enemy, Player, PlayerState};
pub use animation::{Action, ActorType, Animation, AnimationClip};
pub use assets::{AssetError, AssetRegistry, Sprite};
pub use events::{AudioCue, SpawnEvent};
pub use input::{ActionStates, InputAction, TickInput};
pub use level::{demo_level, load_level, save_level, LevelError, LevelFile};
pub use math::{GridPos, Rect, Vec2};
pub use physics::{Body, Collisions};
pub use render::{Canvas, Compositor};
pub use scene::{Scene, SceneConfig, SceneError, TickReport};
pub use tilemap::{Tile, TileKind, TileMap};
