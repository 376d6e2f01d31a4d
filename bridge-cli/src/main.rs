use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use bridge_core::{Card, Contract, Player};
use bridge_game::Game;
use bridge_rng::Xoshiro256PlusPlus;
use bridge_solver::AlphaBetaSolver;
use clap::Parser;

/// Maximum Generate+Filter attempts per `sample` command before giving up
/// on gathering the requested number of accepted deals.
const SAMPLE_ATTEMPT_CAP: usize = 2000;

#[derive(Parser)]
#[command(name = "bridge-play")]
#[command(about = "Interactive driver for the partial-information bridge play engine", long_about = None)]
struct Args {
    /// PBN deal string, four space-separated hands in N E S W order
    /// (`...` for an unknown hand).
    deal: String,

    /// Opening leader seat: N, E, S or W.
    leader: char,

    /// Contract string: a level digit 1-7 followed by C/D/H/S/N, or empty
    /// for no contract.
    #[arg(default_value = "")]
    contract: String,

    /// Seed the sampler's RNG deterministically (defaults to current time).
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let leader = Player::from_char(args.leader).unwrap_or_else(|| {
        eprintln!("invalid leader seat: {}", args.leader);
        std::process::exit(1);
    });
    let contract = Contract::parse(&args.contract).unwrap_or_else(|| {
        eprintln!("invalid contract string: {}", args.contract);
        std::process::exit(1);
    });
    let mut game = Game::from_pbn(&args.deal, leader, contract).unwrap_or_else(|e| {
        eprintln!("invalid deal string: {}", e);
        std::process::exit(1);
    });

    let seed = args.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

    println!("leader={:?} contract={}", game.leader(), game.contract().format());
    print_moves(&game);

    let stdin = io::stdin();
    print!("> ");
    let _ = io::stdout().flush();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let line = line.trim();
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("play") => match parts.next().map(bridge_pbn::parse_card) {
                Some(Ok(card)) => {
                    if game.play(card, true) {
                        println!("ok");
                        if game.is_over() {
                            println!("over: ns={} ew={}", game.ns_tricks(), game.ew_tricks());
                        }
                    } else {
                        println!("illegal");
                    }
                }
                Some(Err(e)) => println!("parse error: {}", e),
                None => println!("usage: play <card>"),
            },
            Some("undo") => println!("{}", if game.undo() { "ok" } else { "empty" }),
            Some("redo") => println!("{}", if game.redo() { "ok" } else { "empty" }),
            Some("moves") => print_moves(&game),
            Some("sample") => {
                let n: usize = parts.next().and_then(|s| s.parse().ok()).unwrap_or(20);
                run_sample(&game, &mut rng, n);
            }
            Some("quit") | Some("exit") => break,
            Some(other) => println!("unknown command: {}", other),
            None => {}
        }
        print!("> ");
        let _ = io::stdout().flush();
    }
}

fn print_moves(game: &Game) {
    let moves: Vec<String> = game.get_moves().iter().map(|c| c.to_string()).collect();
    println!("moves: {}", moves.join(" "));
}

/// `sample <n>`: Generate+Filter up to `n` accepted deals (or the attempt
/// cap, whichever comes first), solve each with `AlphaBetaSolver`, and
/// print the average tricks per currently legal move.
fn run_sample(game: &Game, rng: &mut Xoshiro256PlusPlus, n: usize) {
    let sampler = game.sampling();
    let mut totals: HashMap<Card, u32> = HashMap::new();
    let mut accepted = 0usize;
    let mut attempts = 0usize;

    while accepted < n && attempts < SAMPLE_ATTEMPT_CAP {
        attempts += 1;
        let deal = sampler.generate(rng);
        if !sampler.is_complete(&deal) || !sampler.filter(&deal) {
            continue;
        }
        match sampler.solve::<AlphaBetaSolver>(&deal) {
            Ok(scores) => {
                for (card, tricks) in scores {
                    *totals.entry(card).or_insert(0) += tricks as u32;
                }
                accepted += 1;
            }
            Err(e) => {
                eprintln!("solver error: {}", e);
                return;
            }
        }
    }

    if accepted == 0 {
        println!("no accepted samples in {} attempts", attempts);
        return;
    }

    println!("{} accepted deals ({} attempts)", accepted, attempts);
    let mut rows: Vec<(Card, f64)> = totals
        .into_iter()
        .map(|(card, total)| (card, total as f64 / accepted as f64))
        .collect();
    rows.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
    for (card, avg) in rows {
        println!("{}: {:.2}", card, avg);
    }
}
