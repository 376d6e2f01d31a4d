use std::collections::HashMap;

use bridge_core::{Card, Player, Strain, Suit};

use crate::SolverError;

/// Capabilities the sampler needs from a double-dummy analyzer: construct
/// from a deal, replay cards already played in the open trick, then score
/// individual candidate moves by the tricks the player on lead can still
/// take with best continuation from both sides.
pub trait DoubleDummySolver: Sized {
    fn new_deal(hands: &[u64; 4], strain: Strain, leader: Player) -> Self;
    fn play(&mut self, cards: &[Card]) -> Result<(), SolverError>;
    fn tricks_for(&self, card: Card) -> Result<u8, SolverError>;
}

#[derive(Clone, Debug)]
struct TrickState {
    leader: Player,
    cards: Vec<(Player, Card)>,
    trump: Option<Suit>,
}

impl TrickState {
    fn new(leader: Player, trump: Option<Suit>) -> Self {
        TrickState {
            leader,
            cards: Vec::with_capacity(4),
            trump,
        }
    }

    fn led_suit(&self) -> Option<Suit> {
        self.cards.first().map(|(_, c)| c.suit)
    }

    fn beats(&self, challenger: Card, incumbent: Card, led: Suit) -> bool {
        if let Some(trump) = self.trump {
            if challenger.suit == trump && incumbent.suit != trump {
                return true;
            }
            if incumbent.suit == trump && challenger.suit != trump {
                return false;
            }
        }
        if challenger.suit == led && incumbent.suit != led {
            return true;
        }
        if incumbent.suit == led && challenger.suit != led {
            return false;
        }
        challenger.suit == incumbent.suit && challenger.rank > incumbent.rank
    }

    fn winner(&self) -> Player {
        let led = self.led_suit().expect("trick has at least one card");
        let mut winning = self.cards[0];
        for &(player, card) in &self.cards[1..] {
            if self.beats(card, winning.1, led) {
                winning = (player, card);
            }
        }
        winning.0
    }
}

#[derive(Clone, Debug)]
struct GameState {
    hands: [u64; 4],
    trick: TrickState,
    tricks_won: [u8; 2],
    total_tricks: u8,
    tricks_played: u8,
}

fn side_index(player: Player) -> usize {
    if player.is_ns() {
        0
    } else {
        1
    }
}

impl GameState {
    fn next_player(&self) -> Player {
        match self.trick.cards.last() {
            Some((player, _)) => player.next(),
            None => self.trick.leader,
        }
    }

    fn legal_moves(&self) -> Vec<Card> {
        let player = self.next_player();
        let hand = self.hands[player as usize];
        if let Some(led) = self.trick.led_suit() {
            let following = hand & led.mask();
            if following != 0 {
                return bridge_core::mask_cards(following).collect();
            }
        }
        bridge_core::mask_cards(hand).collect()
    }

    fn is_terminal(&self) -> bool {
        self.tricks_played >= self.total_tricks
    }

    fn at_trick_boundary(&self) -> bool {
        self.trick.cards.is_empty()
    }

    fn play_card(&mut self, card: Card) -> bool {
        let player = self.next_player();
        if self.hands[player as usize] & card.bit() == 0 {
            return false;
        }
        if let Some(led) = self.trick.led_suit() {
            let hand = self.hands[player as usize];
            if card.suit != led && hand & led.mask() != 0 {
                return false;
            }
        }
        self.hands[player as usize] &= !card.bit();
        self.trick.cards.push((player, card));

        if self.trick.cards.len() == 4 {
            let winner = self.trick.winner();
            self.tricks_won[side_index(winner)] += 1;
            self.tricks_played += 1;
            self.trick = TrickState::new(winner, self.trick.trump);
        }
        true
    }

    fn hash(&self) -> u64 {
        let mut h = 0u64;
        for (seat, &mask) in self.hands.iter().enumerate() {
            h ^= mask.rotate_left((seat * 13) as u32);
        }
        h ^= (self.trick.leader as u64) << 56;
        h ^= (self.tricks_won[0] as u64) << 48;
        h ^= (self.tricks_won[1] as u64) << 40;
        h
    }
}

#[derive(Clone, Copy)]
enum TtEntry {
    Exact(u8),
    LowerBound(u8),
    UpperBound(u8),
}

type TranspositionTable = HashMap<u64, TtEntry>;

/// Self-contained alpha-beta double-dummy solver with transposition-table
/// memoization, scoped to one `new_deal` per instance.
pub struct AlphaBetaSolver {
    state: GameState,
}

impl AlphaBetaSolver {
    fn side_to_move_value(&self, card: Card) -> Option<(GameState, usize)> {
        let player = self.state.next_player();
        let side = side_index(player);
        let mut next = self.state.clone();
        if !next.play_card(card) {
            return None;
        }
        Some((next, side))
    }

    fn alpha_beta(
        &self,
        state: &GameState,
        side: usize,
        mut alpha: u8,
        mut beta: u8,
        tt: &mut TranspositionTable,
    ) -> u8 {
        if state.is_terminal() {
            return state.tricks_won[side];
        }

        let boundary_hash = if state.at_trick_boundary() {
            let h = state.hash();
            if let Some(&entry) = tt.get(&h) {
                match entry {
                    TtEntry::Exact(v) => return v,
                    TtEntry::LowerBound(v) => {
                        if v >= beta {
                            return v;
                        }
                        alpha = alpha.max(v);
                    }
                    TtEntry::UpperBound(v) => {
                        if v <= alpha {
                            return v;
                        }
                        beta = beta.min(v);
                    }
                }
            }
            Some(h)
        } else {
            None
        };

        let maximizing = side_index(state.next_player()) == side;
        let moves = state.legal_moves();
        let orig_alpha = alpha;

        let value = if maximizing {
            let mut value = 0u8;
            for card in moves {
                let mut next = state.clone();
                next.play_card(card);
                let score = self.alpha_beta(&next, side, alpha, beta, tt);
                value = value.max(score);
                alpha = alpha.max(value);
                if alpha >= beta {
                    break;
                }
            }
            value
        } else {
            let mut value = state.total_tricks;
            for card in moves {
                let mut next = state.clone();
                next.play_card(card);
                let score = self.alpha_beta(&next, side, alpha, beta, tt);
                value = value.min(score);
                beta = beta.min(value);
                if alpha >= beta {
                    break;
                }
            }
            value
        };

        if let Some(h) = boundary_hash {
            let entry = if value <= orig_alpha {
                TtEntry::UpperBound(value)
            } else if value >= beta {
                TtEntry::LowerBound(value)
            } else {
                TtEntry::Exact(value)
            };
            tt.insert(h, entry);
        }

        value
    }
}

impl DoubleDummySolver for AlphaBetaSolver {
    fn new_deal(hands: &[u64; 4], strain: Strain, leader: Player) -> Self {
        let total_tricks = hands[0].count_ones() as u8;
        AlphaBetaSolver {
            state: GameState {
                hands: *hands,
                trick: TrickState::new(leader, strain.trump_suit()),
                tricks_won: [0, 0],
                total_tricks,
                tricks_played: 0,
            },
        }
    }

    fn play(&mut self, cards: &[Card]) -> Result<(), SolverError> {
        for &card in cards {
            if !self.state.play_card(card) {
                return Err(SolverError::IllegalReplay);
            }
        }
        Ok(())
    }

    fn tricks_for(&self, card: Card) -> Result<u8, SolverError> {
        if self.state.is_terminal() {
            return Err(SolverError::NotAtTrickBoundary);
        }
        let (next, side) = self
            .side_to_move_value(card)
            .ok_or(SolverError::IllegalReplay)?;
        let mut tt = HashMap::new();
        let total = self.alpha_beta(&next, side, 0, self.state.total_tricks, &mut tt);
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_core::{Rank, Suit};

    fn one_suit_per_hand() -> [u64; 4] {
        let mut hands = [0u64; 4];
        let suits = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];
        for (seat, &suit) in suits.iter().enumerate() {
            for rank in Rank::ALL {
                hands[seat] |= Card::new(suit, rank).bit();
            }
        }
        hands
    }

    #[test]
    fn side_with_all_trumps_wins_every_trick() {
        let hands = one_suit_per_hand();
        let solver = AlphaBetaSolver::new_deal(&hands, Strain::Suit(Suit::Spades), Player::North);
        let tricks = solver.tricks_for(Card::new(Suit::Spades, Rank::Ace)).unwrap();
        assert_eq!(tricks, 13);
    }

    #[test]
    fn illegal_card_in_replay_is_rejected() {
        let hands = one_suit_per_hand();
        let mut solver = AlphaBetaSolver::new_deal(&hands, Strain::NoTrump, Player::North);
        let err = solver.play(&[Card::new(Suit::Clubs, Rank::Two)]).unwrap_err();
        assert_eq!(err, SolverError::IllegalReplay);
    }

    #[test]
    fn replay_advances_trick_before_scoring() {
        let hands = one_suit_per_hand();
        let mut solver = AlphaBetaSolver::new_deal(&hands, Strain::NoTrump, Player::North);
        solver.play(&[Card::new(Suit::Spades, Rank::Ace)]).unwrap();
        let tricks = solver.tricks_for(Card::new(Suit::Hearts, Rank::Ace)).unwrap();
        assert!(tricks <= 13);
    }
}
