use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    Jump,
}

const ACTION_COUNT: usize = 3;

/// "Is this logical action currently active" predicate consulted by
/// motion controllers. Hosts map their own devices onto it.
pub trait ActionSource {
    fn is_active(&self, action: InputAction) -> bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub fn from_actions(actions: &[InputAction]) -> Self {
        let mut states = Self::default();
        for &action in actions {
            states.press(action);
        }
        states
    }

    /// Marks `action` active. Holding both directions at once cancels both.
    pub fn press(&mut self, action: InputAction) {
        self.down[action.index()] = true;
        if self.is_down(InputAction::MoveLeft) && self.is_down(InputAction::MoveRight) {
            self.down[InputAction::MoveLeft.index()] = false;
            self.down[InputAction::MoveRight.index()] = false;
        }
    }

    pub fn release(&mut self, action: InputAction) {
        self.down[action.index()] = false;
    }

    pub fn set(&mut self, action: InputAction, is_down: bool) {
        if is_down {
            self.press(action);
        } else {
            self.release(action);
        }
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    pub fn clear(&mut self) {
        self.down = [false; ACTION_COUNT];
    }
}

impl ActionSource for ActionStates {
    fn is_active(&self, action: InputAction) -> bool {
        self.is_down(action)
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveLeft => 0,
            InputAction::MoveRight => 1,
            InputAction::Jump => 2,
        }
    }
}
