//! Phantom-Go command line driver.
//!
//! ## Usage
//!
//! - `phantom-go` - Run the demo game
//! - `phantom-go selfplay` - Play full phantom games between two agents
//! - `phantom-go demo` - Quick demo with a small simulation budget

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};

use phantom_go::agent::{PlayerAgent, RandomAgent, SearchAgent};
use phantom_go::board::Player;
use phantom_go::constants::N_SIMS;
use phantom_go::controller::GameController;
use phantom_go::point::Point;
use phantom_go::search::SearchConfig;

/// Attempts an agent gets per turn before the referee forces a pass.
const MAX_ATTEMPTS_PER_TURN: usize = 100;

/// Phantom-Go: a 9x9 Phantom Go MCTS engine
#[derive(Parser)]
#[command(name = "phantom-go")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play phantom games between two agents and report results
    Selfplay {
        /// Simulations per move decision
        #[arg(long, default_value_t = N_SIMS)]
        sims: usize,
        /// Seed for all randomness in the run
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Number of games to play
        #[arg(long, default_value_t = 1)]
        games: usize,
        /// Use the uniform random baseline for White
        #[arg(long)]
        random_white: bool,
        /// Print search statistics after every decision
        #[arg(long)]
        verbose: bool,
    },
    /// Run a quick demo game with a small simulation budget
    Demo,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Selfplay { sims, seed, games, random_white, verbose }) => {
            let config = SearchConfig { simulations: sims, verbose, ..Default::default() };
            let mut black_wins = 0;
            for game_index in 0..games {
                let game_seed = seed.wrapping_add(game_index as u64);
                let winner = run_game(config, game_seed, random_white)
                    .with_context(|| format!("game {} failed", game_index + 1))?;
                if winner == Player::Black {
                    black_wins += 1;
                }
            }
            println!(
                "Black won {black_wins}/{games} game(s) against {}",
                if random_white { "random White" } else { "search White" }
            );
        }
        Some(Commands::Demo) | None => {
            println!("Phantom-Go: 9x9 Phantom Go MCTS engine\n");
            let config = SearchConfig { simulations: 60, ..Default::default() };
            run_game(config, 7, true)?;
        }
    }
    Ok(())
}

/// Drive one phantom game to completion and return the winner.
fn run_game(config: SearchConfig, seed: u64, random_white: bool) -> anyhow::Result<Player> {
    let mut black: Box<dyn PlayerAgent> =
        Box::new(SearchAgent::new(Player::Black, config, seed));
    let mut white: Box<dyn PlayerAgent> = if random_white {
        Box::new(RandomAgent::new(Player::White, seed.wrapping_add(1)))
    } else {
        Box::new(SearchAgent::new(Player::White, config, seed.wrapping_add(1)))
    };
    let mut game = GameController::new();

    while !game.is_over() {
        let mover = game.current_player();
        let (agent, observer) = if mover == Player::Black {
            (&mut black, &mut white)
        } else {
            (&mut white, &mut black)
        };

        let mut attempts = 0;
        loop {
            let (pt, elapsed) = agent.generate_move();
            if pt.is_pass() {
                let result = game.pass();
                // Passes are public, both sides hear about them.
                agent.observe(mover, Point::PASS, &result);
                observer.observe(mover, Point::PASS, &result);
                println!("{mover} passes ({:.1} ms)", elapsed.as_secs_f64() * 1000.0);
                break;
            }

            let result = game.make_move(pt);
            agent.observe(mover, pt, &result);
            if result.is_success() {
                // The opponent only hears that a move happened and what died.
                observer.observe(mover, Point::UNLEGAL, &result);
                println!(
                    "{mover} plays {pt} after {} attempt(s) ({:.1} ms){}",
                    attempts + 1,
                    elapsed.as_secs_f64() * 1000.0,
                    if result.captured.is_empty() {
                        String::new()
                    } else {
                        format!(", capturing {}", result.captured.len())
                    }
                );
                break;
            }

            attempts += 1;
            if attempts >= MAX_ATTEMPTS_PER_TURN {
                // A stuck agent forfeits the turn rather than the run.
                let result = game.pass();
                agent.observe(mover, Point::PASS, &result);
                observer.observe(mover, Point::PASS, &result);
                eprintln!("{mover} forced to pass after {attempts} failed attempts");
                break;
            }
        }
    }

    println!("\nFinal position:\n{}", game.board());
    let result = game.score_result();
    println!(
        "Result: {result} (captures B:{} W:{})",
        game.captures(Player::Black),
        game.captures(Player::White)
    );
    if game.move_history().is_empty() {
        bail!("game ended with no moves on record");
    }
    Ok(result.winner)
}
