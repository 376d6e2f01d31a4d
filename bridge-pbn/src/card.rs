use bridge_core::{Card, Rank, Suit};

use crate::ParseError;

/// Parse a two-character card string: rank then suit, either case.
pub fn parse_card(s: &str) -> Result<Card, ParseError> {
    let chars: Vec<char> = s.trim().chars().collect();
    if chars.len() != 2 {
        return Err(ParseError::new(format!(
            "expected a two-character card string, got {:?}",
            s
        )));
    }
    let rank = Rank::from_char(chars[0])
        .ok_or_else(|| ParseError::new(format!("invalid rank character: {}", chars[0])))?;
    let suit = Suit::from_char(chars[1])
        .ok_or_else(|| ParseError::new(format!("invalid suit character: {}", chars[1])))?;
    Ok(Card::new(suit, rank))
}

/// Format a card as uppercase rank-then-suit, e.g. `AS`, `TD`.
pub fn format_card(card: Card) -> String {
    card.to_string()
}
