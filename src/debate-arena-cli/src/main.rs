//! Debate Arena CLI - argue a topic against an AI opponent
//!
//! Four AI judges score each finished debate and the result feeds an Elo
//! rating and per-category mastery stats.

mod render;

use std::env;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use debate_arena_core::{
    ApiSettings, ArenaError, ArenaEvent, Config, DebateArena, Difficulty, OpenAiGenerator,
    Position, Speaker, StartRequest, default_config,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "debate-arena.toml";

/// Recent debates listed in the stats view.
const STATS_RECENT: usize = 3;

#[derive(Parser)]
#[command(
    name = "debate-arena",
    version,
    about = "Debate Arena - argue against an AI and get judged",
    long_about = "Debate a topic against an AI opponent over an OpenAI-compatible API. \
                  Four AI judges score the debate and your Elo rating is tracked across debates."
)]
struct Cli {
    /// Participant whose debate the command applies to
    #[arg(short, long, global = true, default_value = "local", value_name = "NAME")]
    user: String,

    /// Path to a TOML config file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List debate topics
    Topics {
        /// Only topics in this category
        #[arg(long)]
        category: Option<String>,

        /// Only topics of this difficulty (beginner, intermediate, advanced)
        #[arg(long)]
        difficulty: Option<Difficulty>,
    },
    /// Start a new debate, replacing any unfinished one
    Start(StartArgs),
    /// Submit your argument for the current stage
    Argue {
        /// Your argument
        #[arg(required = true, num_args = 1.., value_name = "TEXT")]
        text: Vec<String>,
    },
    /// Continue a debate that is waiting on the opponent or the judges
    Resume,
    /// Show the debate in progress
    Status,
    /// Abandon the debate in progress without recording it
    Cancel,
    /// Show rating, record and topic mastery
    Stats,
    /// List recently completed debates
    History {
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },
    /// Play a whole debate interactively
    Play(StartArgs),
}

#[derive(Args)]
struct StartArgs {
    /// Topic id (see `topics`); random when omitted
    #[arg(short, long)]
    topic: Option<u32>,

    /// Restrict the random topic to a difficulty
    #[arg(short, long)]
    difficulty: Option<Difficulty>,

    /// Side to argue (for, against); random when omitted
    #[arg(short, long)]
    position: Option<Position>,
}

impl From<StartArgs> for StartRequest {
    fn from(args: StartArgs) -> Self {
        StartRequest {
            topic_id: args.topic,
            difficulty: args.difficulty,
            position: args.position,
        }
    }
}

/// Generators for the opponent and the judging panel.
struct Generators {
    opponent: OpenAiGenerator,
    judge: OpenAiGenerator,
}

impl Generators {
    fn from_env(config: &Config) -> Result<Self, ArenaError> {
        let api_base = env::var("OPENAI_API_BASE")
            .or_else(|_| env::var("OPENAI_BASE_URL"))
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        let api_key = env::var("OPENAI_API_KEY").unwrap_or_else(|_| {
            eprintln!(
                "{}",
                "Warning: OPENAI_API_KEY not set. API calls may fail.".yellow()
            );
            String::new()
        });

        let api = ApiSettings::new(api_base, api_key);
        Ok(Self {
            opponent: OpenAiGenerator::new(&api, config.generation.opponent.clone())?,
            judge: OpenAiGenerator::new(&api, config.generation.judge.clone())?,
        })
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        if e.is_user_facing() {
            eprintln!("{} {}", "Error:".yellow().bold(), e);
        } else {
            eprintln!("{} {}", "Error:".red().bold(), e);
        }
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config, ArenaError> {
    match path {
        Some(path) => Config::load(path),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => Config::load(DEFAULT_CONFIG_FILE),
        None => Ok(default_config()),
    }
}

async fn run(cli: Cli) -> Result<(), ArenaError> {
    let config = load_config(cli.config.as_deref())?;
    info!(
        data_dir = %config.storage.data_dir.display(),
        opponent = %config.generation.opponent.name,
        judge = %config.generation.judge.name,
        "configuration loaded"
    );

    let mut arena = DebateArena::from_config(&config)?.with_callback(create_console_callback());
    let user = cli.user.as_str();

    match cli.command {
        Command::Topics {
            category,
            difficulty,
        } => {
            render::topics(&arena.catalog().filter(category.as_deref(), difficulty));
        }
        Command::Start(args) => {
            let debate = arena.start_debate(user, args.into())?;
            render::new_debate(&debate);
            render::next_turn(debate.stage());
        }
        Command::Argue { text } => {
            let generators = Generators::from_env(&config)?;
            argue(&mut arena, user, &text.join(" "), &generators).await?;
        }
        Command::Resume => {
            let generators = Generators::from_env(&config)?;
            advance(&mut arena, user, &generators).await?;
        }
        Command::Status => match arena.active_debate(user) {
            Some(debate) => render::status(&debate),
            None => return Err(ArenaError::NoActiveDebate(user.to_string())),
        },
        Command::Cancel => {
            if arena.cancel(user)? {
                println!("{}", "Debate cancelled.".yellow());
            } else {
                println!("{}", "No active debate to cancel.".dimmed());
            }
        }
        Command::Stats => {
            render::stats(arena.stats(), &arena.recent_debates(STATS_RECENT));
        }
        Command::History { limit } => {
            render::history(&arena.recent_debates(limit));
        }
        Command::Play(args) => {
            let generators = Generators::from_env(&config)?;
            play(&mut arena, user, args.into(), &generators).await?;
        }
    }

    Ok(())
}

/// Record one human argument, then advance the debate.
async fn argue(
    arena: &mut DebateArena,
    user: &str,
    text: &str,
    generators: &Generators,
) -> Result<bool, ArenaError> {
    arena.submit_argument(user, text, None)?;
    advance(arena, user, generators).await
}

/// Run pending opponent turns and judging until the human is up again or the
/// debate is finished. Returns whether the debate finished.
async fn advance(
    arena: &mut DebateArena,
    user: &str,
    generators: &Generators,
) -> Result<bool, ArenaError> {
    loop {
        let stage = arena
            .active_debate(user)
            .ok_or_else(|| ArenaError::NoActiveDebate(user.to_string()))?
            .stage();

        match stage.turn_owner() {
            Some(Speaker::Human) => {
                render::next_turn(stage);
                return Ok(false);
            }
            Some(Speaker::Ai) => {
                debug!(model = generators.opponent.model(), %stage, "asking opponent");
                let reply = arena.run_opponent_turn(user, &generators.opponent).await?;
                render::opponent_reply(reply.stage, &reply.content);
            }
            None => {
                debug!(model = generators.judge.model(), "asking judges");
                let report = arena.run_judging(user, &generators.judge).await?;
                render::results(&report);
                return Ok(true);
            }
        }
    }
}

/// Start a debate and read arguments from stdin until it is judged.
async fn play(
    arena: &mut DebateArena,
    user: &str,
    request: StartRequest,
    generators: &Generators,
) -> Result<(), ArenaError> {
    let debate = arena.start_debate(user, request)?;
    render::new_debate(&debate);
    render::next_turn(debate.stage());
    println!(
        "{}",
        "Type your argument and press Enter. /status, /cancel or /quit at any time.".dimmed()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", ">".bright_cyan().bold());
        std::io::Write::flush(&mut std::io::stdout())?;

        let Some(line) = lines.next_line().await? else {
            println!();
            println!("{}", "Input closed; the debate stays active.".dimmed());
            return Ok(());
        };
        let line = line.trim();

        match line {
            "" => continue,
            "/quit" => {
                println!("{}", "Debate paused. Continue with `argue` or `resume`.".dimmed());
                return Ok(());
            }
            "/cancel" => {
                arena.cancel(user)?;
                println!("{}", "Debate cancelled.".yellow());
                return Ok(());
            }
            "/status" => {
                if let Some(debate) = arena.active_debate(user) {
                    render::status(&debate);
                }
                continue;
            }
            _ => {}
        }

        match argue(arena, user, line, generators).await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) if e.is_user_facing() => {
                eprintln!("{} {}", "Error:".yellow().bold(), e);
            }
            Err(e) => return Err(e),
        }
    }
}

/// Create a callback that prints arena events to the console.
fn create_console_callback() -> Box<dyn Fn(ArenaEvent) + Send + Sync> {
    Box::new(move |event| match event {
        ArenaEvent::JudgingStarted { .. } => render::judging(),
        ArenaEvent::RoundRecorded {
            participant,
            stage,
            speaker,
        } => {
            debug!(participant = %participant, %stage, %speaker, "round recorded");
        }
        ArenaEvent::DebateStarted { .. }
        | ArenaEvent::DebateCompleted { .. }
        | ArenaEvent::DebateCancelled { .. } => {
            // Rendered by the command that caused them
        }
    })
}
