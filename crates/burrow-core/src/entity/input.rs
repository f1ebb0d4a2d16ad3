//! Player input state

use glam::IVec2;

/// Dig/move axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    #[default]
    Down,
    Up,
}

impl Direction {
    /// Grid offset (y grows downward)
    pub fn offset(self) -> IVec2 {
        match self {
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
            Direction::Down => IVec2::new(0, 1),
            Direction::Up => IVec2::new(0, -1),
        }
    }

    pub fn is_lateral(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// Intent signals for one tick
///
/// `*_pressed` fields are fire-and-forget and cleared after every update;
/// `up_held` is the only level-triggered signal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    pub start_pressed: bool,
    pub left_pressed: bool,
    pub right_pressed: bool,
    pub down_pressed: bool,
    pub up_pressed: bool,
    pub up_held: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.left_pressed = true,
            Direction::Right => self.right_pressed = true,
            Direction::Down => self.down_pressed = true,
            Direction::Up => self.up_pressed = true,
        }
    }

    /// Direction requested this tick; left wins over right over down over up
    pub fn requested_direction(&self) -> Option<Direction> {
        [
            (self.left_pressed, Direction::Left),
            (self.right_pressed, Direction::Right),
            (self.down_pressed, Direction::Down),
            (self.up_pressed, Direction::Up),
        ]
        .into_iter()
        .find_map(|(pressed, direction)| pressed.then_some(direction))
    }

    pub fn is_held(&self, direction: Direction) -> bool {
        direction == Direction::Up && self.up_held
    }

    /// Forget one-shot signals after they were consumed
    pub fn clear_pulses(&mut self) {
        self.start_pressed = false;
        self.left_pressed = false;
        self.right_pressed = false;
        self.down_pressed = false;
        self.up_pressed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_state_new() {
        let input = InputState::new();
        assert!(!input.start_pressed);
        assert!(input.requested_direction().is_none());
        assert!(!input.up_held);
    }

    #[test]
    fn test_requested_direction_priority() {
        let mut input = InputState::new();
        input.press(Direction::Up);
        assert_eq!(input.requested_direction(), Some(Direction::Up));
        input.press(Direction::Right);
        assert_eq!(input.requested_direction(), Some(Direction::Right));
    }

    #[test]
    fn test_clear_pulses_keeps_held() {
        let mut input = InputState::new();
        input.press(Direction::Left);
        input.start_pressed = true;
        input.up_held = true;
        input.clear_pulses();
        assert!(input.requested_direction().is_none());
        assert!(!input.start_pressed);
        assert!(input.is_held(Direction::Up));
        assert!(!input.is_held(Direction::Left));
    }

    #[test]
    fn test_direction_offsets() {
        assert_eq!(Direction::default(), Direction::Down);
        assert_eq!(Direction::Down.offset(), IVec2::new(0, 1));
        assert_eq!(Direction::Up.offset(), IVec2::new(0, -1));
        assert!(Direction::Left.is_lateral());
        assert!(!Direction::Up.is_lateral());
    }
}
