mod error;

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use topic_tangle_allocator::{
    allocate_configured, attach_icebreakers, prepare_selections, CreateRoomRequest, LeftoverPolicy,
    QuestionBank, RoomConfig, UserId, UserSelection,
};
use topic_tangle_config::Config;
use tracing::info;

use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(name = "topic-tangle", version, about)]
struct Cli {
    /// Configuration file, merged with `TOPIC_TANGLE_*` environment variables.
    #[arg(long, global = true, default_value = topic_tangle_config::CONFIG_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a room and print it as JSON.
    CreateRoom {
        #[arg(long)]
        organizer: String,
        /// Topic name, repeat for every topic.
        #[arg(long = "topic", required = true)]
        topics: Vec<String>,
        #[arg(long)]
        min: Option<usize>,
        #[arg(long)]
        max: Option<usize>,
        #[arg(long)]
        style: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        pretty: bool,
    },
    /// Split the selections of a room into breakout groups and print the results as JSON.
    Allocate {
        /// JSON file with `room` and `selections`.
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, value_enum)]
        policy: Option<Policy>,
        /// Attach questions from the built-in question bank.
        #[arg(long)]
        icebreakers: bool,
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Policy {
    PlaceAll,
    TopicMatch,
}

impl From<Policy> for LeftoverPolicy {
    fn from(value: Policy) -> Self {
        match value {
            Policy::PlaceAll => Self::PlaceAll,
            Policy::TopicMatch => Self::TopicMatch,
        }
    }
}

#[derive(Deserialize, Debug)]
struct AllocationInput {
    room: RoomConfig,
    #[serde(default)]
    selections: Vec<UserSelection>,
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut stdout, value)?;
    } else {
        serde_json::to_writer(&mut stdout, value)?;
    }
    writeln!(stdout)?;
    Ok(())
}

fn read_input(path: &Path) -> Result<AllocationInput, CliError> {
    let bytes = fs::read(path).map_err(|source| CliError::ReadInput {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| CliError::ParseInput {
        path: path.to_owned(),
        source,
    })
}

fn run(command: Command, config: Config) -> Result<(), CliError> {
    match command {
        Command::CreateRoom {
            organizer,
            topics,
            min,
            max,
            style,
            seed,
            pretty,
        } => {
            let request = CreateRoomRequest {
                topics,
                min_group_size: min,
                max_group_size: max,
                style,
            };
            let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
            let room = RoomConfig::create(UserId(organizer), &request, &mut rng)?;
            info!(room = %room.id, organizer = %room.organizer_id, "room created");
            print_json(&room, pretty)
        }
        Command::Allocate {
            input,
            seed,
            policy,
            icebreakers,
            pretty,
        } => {
            let AllocationInput { room, selections } = read_input(&input)?;
            room.validate()?;
            let selections = prepare_selections(&room, &selections);

            let mut options = config.allocator;
            if seed.is_some() {
                options.seed = seed;
            }
            if let Some(policy) = policy {
                options.leftover_policy = policy.into();
            }

            let mut results = allocate_configured(&room, &selections, &options);

            if icebreakers || config.icebreakers.enabled {
                let seed = config
                    .icebreakers
                    .seed
                    .or(options.seed)
                    .unwrap_or_else(rand::random);
                attach_icebreakers(&room, &mut results, &QuestionBank::new(seed));
            }

            info!(
                room = %results.room_id,
                groups = results.groups.len(),
                unassigned = results.unassigned_users.len(),
                "breakout groups created"
            );
            print_json(&results, pretty)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = topic_tangle_config::get_config_from(&cli.config)
        .map_err(CliError::from)
        .and_then(|config| {
            topic_tangle_telemetry::setup_telemetry(config.log.filter.as_deref())?;
            run(cli.command, config)
        });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
