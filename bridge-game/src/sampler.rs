use std::collections::{HashMap, VecDeque};

use bridge_core::{mask_cards, Card, Player, Strain, Suit, Trick};
use bridge_rng::Xoshiro256PlusPlus;
use bridge_solver::{DoubleDummySolver, SolverError};

use crate::Constraints;

fn void_bit(voids: u16, seat: Player, suit: Suit) -> bool {
    voids & (1 << (seat as u16 * 4 + suit as u16)) != 0
}

/// A deal sampler bound to an owned copy of a `Game`'s present state.
///
/// §4.6: unplays the current trick on construction so the bound deal masks
/// reflect each seat's holdings as of the trick's start (what a double-dummy
/// solver expects to replay), then draws void-respecting complete deals on
/// request and scores legal moves against them.
pub struct Sampler {
    assigned: [u64; 4],
    needed: [u8; 4],
    hidden_pool: Vec<Card>,
    played: [u64; 4],
    voids: u16,
    strain: Strain,
    trick_leader: Player,
    trick_cards: Vec<Card>,
    constraints: [Constraints; 4],
    legal_moves: Vec<Card>,
}

impl Sampler {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        mut hands: [u64; 4],
        mut plays: [u64; 4],
        hidden: u64,
        voids: u16,
        trick: Trick,
        strain: Strain,
        constraints: [Constraints; 4],
        legal_moves: Vec<Card>,
    ) -> Self {
        for i in 0..trick.count {
            let seat = trick.leader.advance(i);
            let card = trick.cards()[i as usize].expect("trick slot within count is filled");
            hands[seat as usize] |= card.bit();
            plays[seat as usize] &= !card.bit();
        }

        let mut assigned = [0u64; 4];
        let mut needed = [0u8; 4];
        for s in 0..4 {
            assigned[s] = hands[s] | plays[s];
            needed[s] = 13 - assigned[s].count_ones() as u8;
        }

        let hidden_pool: Vec<Card> = mask_cards(hidden).collect();
        let trick_cards: Vec<Card> = trick.cards().iter().filter_map(|c| *c).collect();

        Sampler {
            assigned,
            needed,
            hidden_pool,
            played: plays,
            voids,
            strain,
            trick_leader: trick.leader,
            trick_cards,
            constraints,
            legal_moves,
        }
    }

    /// §4.6 Deal generation: a Fisher-Yates-shuffled FIFO draw of the hidden
    /// pool into each seat's remaining slots, skipping (requeueing) cards
    /// that would contradict a proved void. A seat whose every remaining
    /// pool card is void-blocked is left short — the caller detects this via
    /// [`Sampler::is_complete`] and retries with a fresh shuffle.
    pub fn generate(&self, rng: &mut Xoshiro256PlusPlus) -> [u64; 4] {
        let mut pool: Vec<Card> = self.hidden_pool.clone();
        rng.shuffle(&mut pool);
        let mut queue: VecDeque<Card> = pool.into();

        let mut deal = self.assigned;
        let mut needed = self.needed;

        'seats: for s in 0..4 {
            let seat = Player::from_index(s as u8).expect("seat index in 0..4");
            let mut stalled = 0usize;
            while needed[s] > 0 {
                let Some(card) = queue.pop_front() else {
                    break 'seats;
                };
                if void_bit(self.voids, seat, card.suit) {
                    queue.push_back(card);
                    stalled += 1;
                    if stalled > queue.len() {
                        // A full cycle of the remaining pool found no
                        // placeable card for this seat: abandon the deal.
                        log::warn!("sampler generate: pool exhausted for seat {:?}", seat);
                        break 'seats;
                    }
                    continue;
                }
                deal[s] |= card.bit();
                needed[s] -= 1;
                stalled = 0;
            }
        }

        deal
    }

    /// Whether a deal produced by [`Sampler::generate`] placed all 52 cards
    /// (13 per seat). A deal that fails this must not be passed to
    /// [`Sampler::filter`] or [`Sampler::solve`].
    pub fn is_complete(&self, deal: &[u64; 4]) -> bool {
        deal.iter().all(|mask| mask.count_ones() == 13)
    }

    /// §4.6 Filtering: every seat whose constraints are `edited` must have
    /// its HCP and all four suit lengths fall within the configured ranges.
    /// Unedited seats always pass.
    pub fn filter(&self, deal: &[u64; 4]) -> bool {
        for s in 0..4 {
            let c = &self.constraints[s];
            if !c.edited {
                continue;
            }
            let hand = deal[s];
            let hcp: u8 = mask_cards(hand).map(|card| card.hcp()).sum();
            if !c.hcp.contains(hcp) {
                return false;
            }
            for suit in Suit::ALL {
                let len = (hand & suit.mask()).count_ones() as u8;
                if !c.suit_range(suit).contains(len) {
                    return false;
                }
            }
        }
        true
    }

    /// §4.6 Scoring: replay the open trick through `solver`, then ask it for
    /// the resulting trick count for every currently legal move.
    pub fn solve<S: DoubleDummySolver>(&self, deal: &[u64; 4]) -> Result<HashMap<Card, u8>, SolverError> {
        let mut solver = S::new_deal(deal, self.strain, self.trick_leader);
        if !self.trick_cards.is_empty() {
            solver.play(&self.trick_cards)?;
        }
        let mut result = HashMap::with_capacity(self.legal_moves.len());
        for &card in &self.legal_moves {
            result.insert(card, solver.tricks_for(card)?);
        }
        Ok(result)
    }

    /// Format `deal` as a PBN string, omitting cards already played in
    /// completed tricks (the current, unplayed-for-replay trick's cards
    /// remain visible, matching §6's sampler output contract).
    pub fn to_pbn(&self, deal: &[u64; 4]) -> String {
        bridge_pbn::format_deal(deal, &self.played)
    }
}
