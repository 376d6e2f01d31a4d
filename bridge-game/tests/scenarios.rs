use bridge_core::{Card, Contract, Player, Rank, Strain, Suit};
use bridge_game::{Constraints, Game, Range};
use bridge_rng::Xoshiro256PlusPlus;
use bridge_solver::AlphaBetaSolver;

fn card(suit: Suit, rank: Rank) -> Card {
    Card::new(suit, rank)
}

#[test]
fn scenario_plain_trick_win() {
    let mut game = Game::from_pbn(
        "AKQJ.T987.6543.2 ... ... ...",
        Player::North,
        Contract::new(3, Strain::NoTrump),
    )
    .unwrap();
    assert!(game.play(card(Suit::Spades, Rank::Ace), true));
    for _ in 0..3 {
        let mv = game.get_moves()[0];
        assert!(game.play(mv, true));
    }
    assert_eq!(game.leader(), Player::North);
    assert_eq!(game.ns_tricks(), 1);
    assert_eq!(game.ew_tricks(), 0);
}

#[test]
fn scenario_trump_ruff_beats_led_suit() {
    let mut game = Game::from_pbn(
        "A... 2... .2.. 3...",
        Player::North,
        Contract::new(4, Strain::Suit(Suit::Hearts)),
    )
    .unwrap();
    assert!(game.play(card(Suit::Spades, Rank::Ace), true));
    assert!(game.play(card(Suit::Spades, Rank::Two), true));
    assert!(game.play(card(Suit::Hearts, Rank::Two), true));
    assert!(game.play(card(Suit::Spades, Rank::Three), true));
    assert_eq!(game.leader(), Player::South);
    assert_eq!(game.ns_tricks(), 1);
}

/// North and West are both fully known (13 cards each, West void of
/// spades), leaving South as the sole non-leader seat with `lefts > 0`
/// once East proves void in spades.
fn spades_known_to_north_and_west() -> [u64; 4] {
    let mut north = card(Suit::Spades, Rank::Ace).bit()
        | card(Suit::Spades, Rank::King).bit()
        | card(Suit::Spades, Rank::Queen).bit()
        | card(Suit::Spades, Rank::Jack).bit();
    for rank in Rank::ALL.iter().take(9) {
        north |= card(Suit::Hearts, *rank).bit();
    }
    let mut west = 0u64;
    for rank in Rank::ALL {
        west |= card(Suit::Clubs, rank).bit();
    }
    [north, 0, 0, west]
}

#[test]
fn scenario_void_inference_forces_assignment() {
    let mut game = Game::new(
        spades_known_to_north_and_west(),
        Player::North,
        Contract::new(3, Strain::NoTrump),
    );
    assert!(game.play(card(Suit::Spades, Rank::Ace), true));
    // East discards a diamond (showing out of spades); West holds every
    // club, so East's hidden cards can only be diamonds or hearts.
    assert!(game.play(card(Suit::Diamonds, Rank::Two), true));
    // North holds 4 of the 13 spades; the remaining 9 are forced into
    // South's known hand since West is also fully known and void.
    assert_eq!(game.hand(Player::South).count_ones(), 9);
    assert_eq!(game.lefts(Player::South), 4);
}

#[test]
fn scenario_undo_restores_voids_and_hidden() {
    let mut game = Game::new(
        spades_known_to_north_and_west(),
        Player::North,
        Contract::new(3, Strain::NoTrump),
    );
    let before = game.clone();
    assert!(game.play(card(Suit::Spades, Rank::Ace), true));
    assert!(game.play(card(Suit::Diamonds, Rank::Two), true));
    assert!(game.undo());
    assert!(game.undo());
    assert_eq!(game, before);
}

#[test]
fn scenario_is_over_at_exactly_thirteen_tricks() {
    let mut game = Game::from_pbn(
        "AKQJT98765432... ............... ............... ...............",
        Player::North,
        Contract::new(7, Strain::NoTrump),
    )
    .unwrap();
    for rank in Rank::ALL {
        assert!(!game.is_over());
        assert!(game.play(card(Suit::Spades, rank), true));
    }
    assert!(game.is_over());
    assert_eq!(game.ns_tricks(), 13);
}

#[test]
fn scenario_sampler_respects_constraints() {
    let mut game = Game::from_pbn(
        "AKQJ.T987.6543.2 ... ... ...",
        Player::North,
        Contract::new(3, Strain::NoTrump),
    )
    .unwrap();
    let mut east = Constraints::new();
    east.set_hcp(Range::new(15, 17));
    east.set_suit(Suit::Spades, Range::new(5, 5));
    game.set_constraints(Player::East, east);

    let sampler = game.sampling();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(2024);
    let mut accepted = 0;
    for _ in 0..5000 {
        let deal = sampler.generate(&mut rng);
        if !sampler.is_complete(&deal) || !sampler.filter(&deal) {
            continue;
        }
        let east_hand = deal[Player::East as usize];
        let hcp: u8 = bridge_core::mask_cards(east_hand).map(|c| c.hcp()).sum();
        let spades = (east_hand & Suit::Spades.mask()).count_ones();
        assert!((15..=17).contains(&hcp));
        assert_eq!(spades, 5);
        accepted += 1;
        if accepted >= 10 {
            break;
        }
    }
    assert!(accepted > 0, "expected at least one accepted deal in 5000 attempts");
}

#[test]
fn round_trip_play_undo_restores_exact_state() {
    let mut game = Game::from_pbn(
        "AKQJ.T987.6543.2 ... ... ...",
        Player::North,
        Contract::new(3, Strain::NoTrump),
    )
    .unwrap();
    let initial = game.clone();
    for _ in 0..4 {
        let mv = game.get_moves()[0];
        assert!(game.play(mv, true));
    }
    for _ in 0..4 {
        assert!(game.undo());
    }
    assert_eq!(game, initial);
}

#[test]
fn undo_then_redo_is_identity() {
    let mut game = Game::from_pbn(
        "AKQJ.T987.6543.2 ... ... ...",
        Player::North,
        Contract::new(3, Strain::NoTrump),
    )
    .unwrap();
    assert!(game.play(card(Suit::Spades, Rank::Ace), true));
    let after_play = game.clone();
    assert!(game.undo());
    assert!(game.redo());
    assert_eq!(game, after_play);
}

#[test]
fn clone_is_a_bisimulation() {
    let mut game = Game::from_pbn(
        "AKQJ.T987.6543.2 ... ... ...",
        Player::North,
        Contract::new(3, Strain::NoTrump),
    )
    .unwrap();
    assert!(game.play(card(Suit::Spades, Rank::Ace), true));
    let mut clone = game.clone();

    let moves_game = game.get_moves();
    let moves_clone = clone.get_moves();
    assert_eq!(moves_game, moves_clone);

    let mv = moves_game[0];
    assert_eq!(game.play(mv, true), clone.play(mv, true));
    assert_eq!(game, clone);
}

#[test]
fn is_legal_matches_get_moves_membership() {
    let game = Game::from_pbn(
        "A... 2... .2.. 3...",
        Player::North,
        Contract::new(4, Strain::Suit(Suit::Hearts)),
    )
    .unwrap();
    let moves = game.get_moves();
    for index in 0..52u8 {
        let c = Card::from_index(index).unwrap();
        assert_eq!(game.is_legal(c), moves.contains(&c));
    }
}

#[test]
fn sampler_solve_scores_legal_moves_with_alpha_beta() {
    let mut hands = [0u64; 4];
    let suits = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];
    for (seat, &suit) in suits.iter().enumerate() {
        for rank in Rank::ALL {
            hands[seat] |= card(suit, rank).bit();
        }
    }
    let game = Game::new(hands, Player::North, Contract::new(7, Strain::Suit(Suit::Spades)));
    let sampler = game.sampling();
    let deal = hands;
    assert!(sampler.is_complete(&deal));
    let scores = sampler.solve::<AlphaBetaSolver>(&deal).unwrap();
    assert_eq!(scores[&card(Suit::Spades, Rank::Ace)], 13);
}
