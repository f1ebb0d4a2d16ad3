//! Per-tile dig progress

use glam::IVec2;

/// Tile currently being dug
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigTarget {
    pub position: IVec2,
    pub hp: i32,
    pub max_hp: i32,
}

/// Accumulates elapsed time against one target tile
///
/// Hits are only due once a full dig interval has elapsed since the target
/// was resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DigProgress {
    target: Option<DigTarget>,
    elapsed_ms: f32,
}

impl DigProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a new target and reset the timer
    ///
    /// Returns false (and keeps the accumulated time) when already digging
    /// this position.
    pub fn begin(&mut self, position: IVec2, hp: i32, max_hp: i32) -> bool {
        if self.is_targeting(position) {
            return false;
        }
        self.target = Some(DigTarget {
            position,
            hp,
            max_hp,
        });
        self.elapsed_ms = 0.0;
        true
    }

    pub fn target(&self) -> Option<&DigTarget> {
        self.target.as_ref()
    }

    pub fn is_targeting(&self, position: IVec2) -> bool {
        self.target.is_some_and(|t| t.position == position)
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }

    /// Add elapsed time and return how many hits became due
    pub fn accumulate(&mut self, dt_ms: f32, interval_ms: f32) -> u32 {
        if self.target.is_none() || interval_ms <= 0.0 {
            return 0;
        }
        self.elapsed_ms += dt_ms.max(0.0);
        let hits = (self.elapsed_ms / interval_ms).floor();
        self.elapsed_ms -= hits * interval_ms;
        hits as u32
    }

    /// Record the target's remaining hit points after a hit
    pub fn record_hit(&mut self, hp: i32) {
        if let Some(target) = self.target.as_mut() {
            target.hp = hp;
        }
    }

    pub fn clear(&mut self) {
        self.target = None;
        self.elapsed_ms = 0.0;
    }
}
