use chrono::FixedOffset;
use clap::{Parser, Subcommand};
use paddock_core::{StatType, Tab};
use uuid::Uuid;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000/api/v1";

/// Terminal front-end for the paddock horse-racing game.
#[derive(Debug, Clone, Parser)]
#[command(name = "paddock", version)]
pub struct Cli {
    /// Backend base URL including the `/api/v1` prefix.
    #[arg(long, env = "PADDOCK_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
    /// Offset for interpreting race times, e.g. `+09:00`. Defaults to the
    /// host's local offset.
    #[arg(long, value_name = "+HH:MM")]
    pub utc_offset: Option<FixedOffset>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Load everything and render one tab.
    Show {
        #[arg(long, default_value_t = Tab::Horses)]
        tab: Tab,
        /// Horse to select (honoured on the horses and training tabs).
        #[arg(long)]
        horse: Option<Uuid>,
    },
    CreateUser {
        username: String,
    },
    CreateHorse {
        name: String,
        /// Owner; must be an existing user.
        #[arg(long)]
        owner: Uuid,
        #[arg(long)]
        sire: Option<Uuid>,
        #[arg(long)]
        dam: Option<Uuid>,
    },
    CreateRace {
        name: String,
        /// Local start time, `YYYY-MM-DDTHH:MM`.
        #[arg(long)]
        at: String,
    },
    DeleteUser {
        id: Uuid,
    },
    DeleteHorse {
        id: Uuid,
    },
    DeleteRace {
        id: Uuid,
    },
    /// Run a race and print the standings.
    Simulate {
        race: Uuid,
    },
    Train {
        horse: Uuid,
        #[arg(long)]
        stat: StatType,
        #[arg(long, default_value_t = 1)]
        points: i32,
    },
    Rest {
        horse: Uuid,
    },
    Breed {
        foal_name: String,
        #[arg(long)]
        sire: Uuid,
        #[arg(long)]
        dam: Uuid,
        #[arg(long)]
        owner: Uuid,
    },
    /// Suggest which stat to train next.
    Recommend {
        horse: Uuid,
    },
    RaceStats {
        race: Uuid,
    },
    HorseStats {
        horse: Uuid,
    },
    /// Races scheduled in the future and not yet run.
    Upcoming,
    OwnedBy {
        owner: Uuid,
    },
}
