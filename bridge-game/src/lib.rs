mod constraints;
mod game;
mod sampler;

pub use constraints::{Constraints, Range};
pub use game::Game;
pub use sampler::Sampler;
