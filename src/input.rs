use crate::state::{Axis, SceneState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragButton {
    Left,
    Right,
}

/// Turns pointer drags into cube rotation.
///
/// Left drag spins about X (vertical motion) and Y (horizontal motion);
/// right drag spins about X and Z.
#[derive(Clone, Copy, Debug, Default)]
pub struct DragTracker {
    last_pos: (i32, i32),
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records where the pointer went down
    pub fn press(&mut self, x: i32, y: i32) {
        self.last_pos = (x, y);
    }

    /// Applies the movement since the last event and returns the (dx, dy) used
    pub fn drag(&mut self, x: i32, y: i32, button: DragButton, state: &mut SceneState) -> (i32, i32) {
        let dx = x - self.last_pos.0;
        let dy = y - self.last_pos.1;
        match button {
            DragButton::Left => {
                state.rotate(Axis::X, dy);
                state.rotate(Axis::Y, dx);
            }
            DragButton::Right => {
                state.rotate(Axis::X, dy);
                state.rotate(Axis::Z, dx);
            }
        }
        self.last_pos = (x, y);
        (dx, dy)
    }
}
