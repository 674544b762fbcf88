//! Plays one game between two engines on the console.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gametree::games::{ConnectFour, NineMensMorris, TicTacToe};
use gametree::util::{play_out, replay};
use gametree::{Negamax, NegamaxOptions, Random, Rules, Strategy};
use std::fmt::Display;
use std::io::Write;
use std::time::Duration;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Game {
    Tictactoe,
    ConnectFour,
    Morris,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Game to play
    #[arg(short, long, value_enum, default_value_t = Game::Tictactoe)]
    game: Game,

    /// Time budget per move in milliseconds
    #[arg(short = 't', long, default_value_t = 1000)]
    millis: u64,

    /// Deepest iteration to search, in plies
    #[arg(long)]
    max_depth: Option<u32>,

    /// Seed for the engines' move shuffling
    #[arg(short, long)]
    seed: Option<u64>,

    /// Base of the history bonus (default: 1.5 for morris, 2 otherwise)
    #[arg(long)]
    history_base: Option<f32>,

    /// Moves already played, separated by `;`
    #[arg(short, long, default_value = "")]
    moves: String,

    /// Let the second player move at random
    #[arg(long)]
    random_opponent: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, level),
    )
    .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
    .init();
}

fn run<R>(rules: R, args: &Args, history_base: f32) -> Result<()>
where
    R: Rules + Copy + 'static,
    R::Position: Display,
{
    let (start, mut line) =
        replay(&rules, &args.moves).with_context(|| format!("replaying `{}`", args.moves))?;

    let mut opts = NegamaxOptions::new()
        .with_timeout(Duration::from_millis(args.millis))
        .with_history_base(history_base);
    if let Some(depth) = args.max_depth {
        opts = opts.with_max_depth(depth);
    }
    if let Some(seed) = args.seed {
        opts = opts.with_seed(seed);
    }
    let mut first = Negamax::new(rules, opts).context("configuring the first engine")?;
    let mut second: Box<dyn Strategy<R>> = if args.random_opponent {
        match args.seed {
            Some(seed) => Box::new(Random::seeded(rules, seed)),
            None => Box::new(Random::new(rules)),
        }
    } else {
        Box::new(Negamax::new(rules, opts).context("configuring the second engine")?)
    };

    println!("{} from\n{}", R::NAME, start);
    let (end, winner) = play_out(&rules, start, &mut line, &mut first, second.as_mut())?;
    println!("{}", end);
    match winner {
        Some(player) => println!("{} wins", R::ROLES[player.index()]),
        None => println!("Draw"),
    }
    println!("{}", rules.utility(&end, &line).announce(R::ROLES));
    println!("last search by {}: {}", R::ROLES[0], first.stats());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);
    match args.game {
        Game::Tictactoe => run(TicTacToe, &args, args.history_base.unwrap_or(2.0)),
        Game::ConnectFour => run(ConnectFour, &args, args.history_base.unwrap_or(2.0)),
        Game::Morris => run(NineMensMorris, &args, args.history_base.unwrap_or(1.5)),
    }
}
