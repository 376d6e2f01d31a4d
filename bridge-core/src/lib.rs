mod card;
mod hand;
mod player;
mod strain;
mod trick;

pub use card::{mask_cards, Card, Rank, Suit};
pub use hand::Hand;
pub use player::Player;
pub use strain::{Contract, Strain};
pub use trick::Trick;
