//! Tick-driven accumulators used by the player: dig progress, countdown and
//! step animation

pub mod countdown;
pub mod digging;
pub mod movement;

pub use countdown::{Countdown, CountdownTick};
pub use digging::{DigProgress, DigTarget};
pub use movement::MoveAnimation;
