use std::fmt;
use std::sync::Arc;

use crate::assets::{AssetError, AssetRegistry, Sprite};

/// Immutable animation descriptor. Frames are shared between every instance
/// created from the same clip; playback progress lives in [`Animation`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    frames: Arc<[Sprite]>,
    frame_duration: u32,
    looping: bool,
}

impl AnimationClip {
    pub fn new(
        frames: Vec<Sprite>,
        frame_duration: u32,
        looping: bool,
    ) -> Result<Self, AssetError> {
        if frames.is_empty() {
            return Err(AssetError::EmptyAnimation);
        }
        if frame_duration == 0 {
            return Err(AssetError::ZeroFrameDuration);
        }
        Ok(Self {
            frames: frames.into(),
            frame_duration,
            looping,
        })
    }

    pub fn frame_count(&self) -> u32 {
        self.frames.len() as u32
    }

    pub fn frame_duration(&self) -> u32 {
        self.frame_duration
    }

    pub fn looping(&self) -> bool {
        self.looping
    }

    /// Ticks needed to show every frame once.
    pub fn total_ticks(&self) -> u32 {
        self.frame_duration * self.frame_count()
    }

    /// Fresh playback state starting at tick 0.
    pub fn instantiate(&self) -> Animation {
        Animation {
            clip: self.clone(),
            frame: 0,
            done: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    clip: AnimationClip,
    frame: u32,
    done: bool,
}

impl Animation {
    /// Starts playback part-way through; clamped to the last tick of the clip.
    pub fn starting_at(mut self, frame: u32) -> Self {
        self.frame = frame.min(self.clip.total_ticks() - 1);
        self
    }

    pub fn update(&mut self) {
        let total = self.clip.total_ticks();
        if self.clip.looping {
            self.frame = (self.frame + 1) % total;
        } else {
            self.frame = (self.frame + 1).min(total - 1);
            if self.frame >= total - 1 {
                self.done = true;
            }
        }
    }

    pub fn current_image(&self) -> &Sprite {
        let index = (self.frame / self.clip.frame_duration) as usize;
        &self.clip.frames[index.min(self.clip.frames.len() - 1)]
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn clip(&self) -> &AnimationClip {
        &self.clip
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Idle,
    Run,
    Jump,
    WallSlide,
}

impl Action {
    pub fn name(self) -> &'static str {
        match self {
            Action::Idle => "idle",
            Action::Run => "run",
            Action::Jump => "jump",
            Action::WallSlide => "wall_slide",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorType {
    Player,
    Enemy,
}

impl ActorType {
    pub fn name(self) -> &'static str {
        match self {
            ActorType::Player => "player",
            ActorType::Enemy => "enemy",
        }
    }

    /// Every action this actor type can switch to at runtime.
    pub fn actions(self) -> &'static [Action] {
        match self {
            ActorType::Player => &[Action::Idle, Action::Run, Action::Jump, Action::WallSlide],
            ActorType::Enemy => &[Action::Idle, Action::Run],
        }
    }
}

impl fmt::Display for ActorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn animation_key(actor: ActorType, action: Action) -> String {
    format!("{}/{}", actor.name(), action.name())
}

/// Clips for every action of one actor type, resolved once so a missing
/// animation surfaces when the level is set up rather than mid-tick.
#[derive(Debug, Clone)]
pub struct ClipSet {
    actor: ActorType,
    idle: AnimationClip,
    clips: Vec<(Action, AnimationClip)>,
}

impl ClipSet {
    pub fn resolve(assets: &AssetRegistry, actor: ActorType) -> Result<Self, AssetError> {
        let clips = actor
            .actions()
            .iter()
            .map(|&action| {
                assets
                    .animation(&animation_key(actor, action))
                    .map(|clip| (action, clip.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let idle = assets
            .animation(&animation_key(actor, Action::Idle))?
            .clone();
        Ok(Self { actor, idle, clips })
    }

    pub fn actor(&self) -> ActorType {
        self.actor
    }

    pub fn get(&self, action: Action) -> Option<&AnimationClip> {
        self.clips
            .iter()
            .find(|(candidate, _)| *candidate == action)
            .map(|(_, clip)| clip)
    }
}

/// Active action plus its playback state.
#[derive(Debug, Clone)]
pub struct AnimationController {
    action: Action,
    animation: Animation,
}

impl AnimationController {
    pub fn new(clips: &ClipSet) -> Self {
        Self {
            action: Action::Idle,
            animation: clips.idle.instantiate(),
        }
    }

    /// Switching to the current action keeps its progress.
    pub fn set_action(&mut self, action: Action, clips: &ClipSet) {
        if action == self.action {
            return;
        }
        let Some(clip) = clips.get(action) else {
            debug_assert!(false, "{} has no '{}' clip", clips.actor, action.name());
            return;
        };
        self.action = action;
        self.animation = clip.instantiate();
    }

    pub fn update(&mut self) {
        self.animation.update();
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn current_image(&self) -> &Sprite {
        self.animation.current_image()
    }
}
