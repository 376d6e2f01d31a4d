mod card;
mod deal;
mod error;

pub use card::{format_card, parse_card};
pub use deal::{format_deal, parse_deal};
pub use error::ParseError;
