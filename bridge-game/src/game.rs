use bridge_core::{mask_cards, Card, Contract, Player, Suit, Trick};
use bridge_pbn::ParseError;

use crate::{Constraints, Sampler};

const FULL_DECK: u64 = (1u64 << 52) - 1;

fn priority(card: Card, trump: Option<Suit>, led: Suit) -> u8 {
    if trump == Some(card.suit) {
        2
    } else if card.suit == led {
        1
    } else {
        0
    }
}

fn void_index(seat: Player, suit: Suit) -> u16 {
    seat as u16 * 4 + suit as u16
}

#[derive(Clone, PartialEq)]
struct Snapshot {
    hands: [u64; 4],
    plays: [u64; 4],
    lefts: [u8; 4],
    hidden: u64,
    voids: u16,
    trick: Trick,
    leader: Player,
    ns_tricks: u8,
    ew_tricks: u8,
}

/// A partial-information bridge game: known/hidden card ownership, the
/// trick in progress, and full undo/redo history.
#[derive(Clone, PartialEq)]
pub struct Game {
    hands: [u64; 4],
    plays: [u64; 4],
    lefts: [u8; 4],
    hidden: u64,
    voids: u16,
    trick: Trick,
    leader: Player,
    contract: Contract,
    ns_tricks: u8,
    ew_tricks: u8,
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
    constraints: [Constraints; 4],
}

impl Game {
    /// Build a game from per-seat known-card masks. Seats with a zero mask
    /// are entirely unknown; their 13 cards start in the hidden pool.
    pub fn new(hands: [u64; 4], leader: Player, contract: Contract) -> Self {
        let known = hands[0] | hands[1] | hands[2] | hands[3];
        let hidden = FULL_DECK & !known;
        let mut lefts = [0u8; 4];
        for (s, mask) in hands.iter().enumerate() {
            lefts[s] = 13 - mask.count_ones() as u8;
        }
        Game {
            hands,
            plays: [0; 4],
            lefts,
            hidden,
            voids: 0,
            trick: Trick::new(leader),
            leader,
            contract,
            ns_tricks: 0,
            ew_tricks: 0,
            undo: Vec::new(),
            redo: Vec::new(),
            constraints: [Constraints::default(); 4],
        }
    }

    /// Set the shape/strength constraints a seat must satisfy in sampled
    /// deals. Marks that seat's constraints `edited` so `Sampler::filter`
    /// checks it.
    pub fn set_constraints(&mut self, seat: Player, constraints: Constraints) {
        self.constraints[seat as usize] = constraints;
    }

    pub fn constraints(&self, seat: Player) -> Constraints {
        self.constraints[seat as usize]
    }

    /// Build a game from a PBN deal string (N, E, S, W order, `...` for an
    /// unknown hand).
    pub fn from_pbn(deal: &str, leader: Player, contract: Contract) -> Result<Self, ParseError> {
        let hands = bridge_pbn::parse_deal(deal)?;
        Ok(Game::new(hands, leader, contract))
    }

    pub fn leader(&self) -> Player {
        self.leader
    }

    pub fn contract(&self) -> Contract {
        self.contract
    }

    pub fn ns_tricks(&self) -> u8 {
        self.ns_tricks
    }

    pub fn ew_tricks(&self) -> u8 {
        self.ew_tricks
    }

    pub fn trick(&self) -> &Trick {
        &self.trick
    }

    pub fn hand(&self, seat: Player) -> u64 {
        self.hands[seat as usize]
    }

    pub fn lefts(&self, seat: Player) -> u8 {
        self.lefts[seat as usize]
    }

    fn void_bit(&self, seat: Player, suit: Suit) -> bool {
        self.voids & (1 << void_index(seat, suit)) != 0
    }

    fn set_void(&mut self, seat: Player, suit: Suit) {
        if !self.void_bit(seat, suit) {
            log::debug!("seat {:?} proved void in {:?}", seat, suit);
        }
        self.voids |= 1 << void_index(seat, suit);
    }

    fn all_plays(&self) -> u64 {
        self.plays[0] | self.plays[1] | self.plays[2] | self.plays[3]
    }

    /// §4.1: whether `card` is a legal play for the current leader.
    pub fn is_legal(&self, card: Card) -> bool {
        let leader = self.leader;
        let bit = card.bit();

        let ownership_possible =
            self.hands[leader as usize] & bit != 0 || (self.hidden & bit != 0 && self.lefts[leader as usize] > 0);
        if !ownership_possible {
            return false;
        }

        if self.all_plays() & bit != 0 {
            return false;
        }

        if self.trick.count > 0 {
            let led = self.trick.led_suit().expect("trick in progress has a led suit");
            if self.hands[leader as usize] & led.mask() != 0 && card.suit != led {
                return false;
            }
        }

        if self.void_bit(leader, card.suit) {
            return false;
        }

        true
    }

    /// §4.2: every card that would currently pass `is_legal`.
    pub fn get_moves(&self) -> Vec<Card> {
        let leader = self.leader;
        let hand = self.hands[leader as usize];
        let unplayed = !self.all_plays();

        let mut available = unplayed & hand;
        if self.lefts[leader as usize] > 0 {
            available |= unplayed & self.hidden;
        }

        if self.trick.count > 0 {
            if let Some(led) = self.trick.led_suit() {
                if hand & led.mask() != 0 {
                    available &= led.mask();
                }
            }
        }

        mask_cards(available)
            .filter(|c| !self.void_bit(leader, c.suit))
            .collect()
    }

    /// §4.3: apply a play. With `check=false`, the caller guarantees
    /// legality and §4.1 is skipped.
    pub fn play(&mut self, card: Card, check: bool) -> bool {
        if check && !self.is_legal(card) {
            return false;
        }

        let leader = self.leader;
        let led = if self.trick.count > 0 {
            self.trick.led_suit().expect("trick in progress has a led suit")
        } else {
            card.suit
        };

        self.undo.push(self.snapshot());
        self.redo.clear();

        if card.suit != led {
            self.set_void(leader, led);
            let forced = self.hidden & led.mask();
            if forced != 0 {
                let candidates: Vec<Player> = Player::ALL
                    .iter()
                    .copied()
                    .filter(|&s| s != leader && self.lefts[s as usize] > 0)
                    .collect();
                if candidates.len() == 1 {
                    let target = candidates[0];
                    log::debug!(
                        "forced assignment: {} hidden cards of {:?} go to seat {:?}",
                        forced.count_ones(),
                        led,
                        target
                    );
                    self.hands[target as usize] |= forced;
                    self.lefts[target as usize] -= forced.count_ones() as u8;
                    self.hidden &= !forced;
                }
            }
        }

        let bit = card.bit();
        if self.hands[leader as usize] & bit == 0 {
            self.hidden &= !bit;
            self.lefts[leader as usize] -= 1;
        }
        self.hands[leader as usize] &= !bit;

        self.trick.push(card);
        self.plays[leader as usize] |= bit;

        if self.trick.is_complete() {
            self.resolve_trick();
        } else {
            self.leader = self.leader.next();
        }

        log::trace!("seat {:?} played {}", leader, card);
        true
    }

    fn resolve_trick(&mut self) {
        let trump = self.contract.strain.trump_suit();
        let led = self.trick.led_suit().expect("completed trick has a led suit");
        let cards = self.trick.cards();

        let mut best_i = 0usize;
        let mut best_card = cards[0].expect("completed trick slot is filled");
        let mut best_priority = priority(best_card, trump, led);
        for (i, slot) in cards.iter().enumerate().skip(1) {
            let card = slot.expect("completed trick slot is filled");
            let p = priority(card, trump, led);
            if (p, card.rank) > (best_priority, best_card.rank) {
                best_priority = p;
                best_card = card;
                best_i = i;
            }
        }

        let winner = self.trick.leader.advance(best_i as u8);
        if winner.is_ns() {
            self.ns_tricks += 1;
        } else {
            self.ew_tricks += 1;
        }
        self.leader = winner;
        self.trick = Trick::new(winner);
    }

    pub fn is_over(&self) -> bool {
        self.ns_tricks + self.ew_tricks == 13
    }

    pub fn undo(&mut self) -> bool {
        match self.undo.pop() {
            None => false,
            Some(snap) => {
                let current = self.snapshot();
                self.redo.push(current);
                self.restore(snap);
                true
            }
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.redo.pop() {
            None => false,
            Some(snap) => {
                let current = self.snapshot();
                self.undo.push(current);
                self.restore(snap);
                true
            }
        }
    }

    /// A `Sampler` bound to an owned copy of the present state: hands,
    /// plays, hidden pool, voids, the open trick, the current constraints,
    /// and the current legal-move list (§4.6).
    pub fn sampling(&self) -> Sampler {
        Sampler::new(
            self.hands,
            self.plays,
            self.hidden,
            self.voids,
            self.trick,
            self.contract.strain,
            self.constraints,
            self.get_moves(),
        )
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            hands: self.hands,
            plays: self.plays,
            lefts: self.lefts,
            hidden: self.hidden,
            voids: self.voids,
            trick: self.trick,
            leader: self.leader,
            ns_tricks: self.ns_tricks,
            ew_tricks: self.ew_tricks,
        }
    }

    fn restore(&mut self, snap: Snapshot) {
        self.hands = snap.hands;
        self.plays = snap.plays;
        self.lefts = snap.lefts;
        self.hidden = snap.hidden;
        self.voids = snap.voids;
        self.trick = snap.trick;
        self.leader = snap.leader;
        self.ns_tricks = snap.ns_tricks;
        self.ew_tricks = snap.ew_tricks;
    }
}
