//! Animated step into an already-cleared tile

use glam::{IVec2, Vec2};

/// Linear interpolation between two tile positions over a fixed duration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveAnimation {
    pub from: Vec2,
    pub to: Vec2,
    /// Tile the player occupies once the step completes
    pub target: IVec2,
    elapsed_ms: f32,
    duration_ms: f32,
}

impl MoveAnimation {
    pub fn new(from: Vec2, to: Vec2, target: IVec2, duration_ms: f32) -> Self {
        Self {
            from,
            to,
            target,
            elapsed_ms: 0.0,
            duration_ms: duration_ms.max(0.0),
        }
    }

    /// Advance and return the interpolated position
    pub fn advance(&mut self, dt_ms: f32) -> Vec2 {
        self.elapsed_ms = (self.elapsed_ms + dt_ms.max(0.0)).min(self.duration_ms);
        self.position()
    }

    pub fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            1.0
        } else {
            self.elapsed_ms / self.duration_ms
        }
    }

    pub fn position(&self) -> Vec2 {
        self.from.lerp(self.to, self.progress())
    }

    pub fn is_complete(&self) -> bool {
        self.progress() >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolates_and_completes() {
        let mut step = MoveAnimation::new(Vec2::ZERO, Vec2::new(32.0, 0.0), IVec2::X, 100.0);
        assert_eq!(step.advance(50.0), Vec2::new(16.0, 0.0));
        assert!(!step.is_complete());
        assert_eq!(step.advance(80.0), Vec2::new(32.0, 0.0));
        assert!(step.is_complete());
    }

    #[test]
    fn test_zero_duration_is_instant() {
        let step = MoveAnimation::new(Vec2::ZERO, Vec2::ONE, IVec2::ONE, 0.0);
        assert!(step.is_complete());
        assert_eq!(step.position(), Vec2::ONE);
    }
}
