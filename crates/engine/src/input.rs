use crate::math::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    Jump,
    Dash,
    Quit,
}

const ACTION_COUNT: usize = 5;

/// Held state of every action.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveLeft => 0,
            InputAction::MoveRight => 1,
            InputAction::Jump => 2,
            InputAction::Dash => 3,
            InputAction::Quit => 4,
        }
    }
}

/// Per-tick intent fed to the scene. `jump` and `dash` are press edges,
/// movement follows held keys.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    pub movement: Vec2,
    pub jump: bool,
    pub dash: bool,
}

impl TickInput {
    pub fn new(states: &ActionStates, jump: bool, dash: bool) -> Self {
        let right = states.is_down(InputAction::MoveRight) as i32 as f32;
        let left = states.is_down(InputAction::MoveLeft) as i32 as f32;
        Self {
            movement: Vec2::new(right - left, 0.0),
            jump,
            dash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposing_keys_cancel() {
        let mut states = ActionStates::default();
        states.set(InputAction::MoveLeft, true);
        assert_eq!(TickInput::new(&states, false, false).movement.x, -1.0);
        states.set(InputAction::MoveRight, true);
        assert_eq!(TickInput::new(&states, false, false).movement.x, 0.0);
        states.set(InputAction::MoveLeft, false);
        assert_eq!(TickInput::new(&states, true, false).movement.x, 1.0);
    }
}
