pub mod input;
pub mod player;

pub use input::{Direction, InputState};
pub use player::{Player, PlayerState};
