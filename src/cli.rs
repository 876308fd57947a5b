//! CLI definitions for chanpost.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use chanpost_protocols::{TimeOfDay, Zone};

/// Chanpost CLI.
#[derive(Parser)]
#[command(name = "chanpost")]
#[command(about = "Channel post scheduler - queue content for timed delivery")]
#[command(version)]
pub(crate) struct Cli {
    /// State directory (schedule and config files, default: ~/.chanpost)
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    /// Fixed UTC offset all times-of-day are interpreted in
    #[arg(long, global = true, default_value = "+05:30")]
    pub zone: Zone,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the scheduler in foreground (default)
    Run,

    /// Schedule a post
    Add {
        /// Target channel (defaults to the configured channel)
        #[arg(long)]
        channel: Option<String>,

        /// Text item; repeat for multiple messages
        #[arg(long)]
        text: Vec<String>,

        /// Photo item by file id
        #[arg(long)]
        photo: Vec<String>,

        /// Caption applied to each photo
        #[arg(long)]
        caption: Option<String>,

        /// Poll question
        #[arg(long)]
        poll: Option<String>,

        /// Poll options; repeat per option
        #[arg(long)]
        option: Vec<String>,

        /// Make the poll non-anonymous
        #[arg(long)]
        public_votes: bool,

        /// Allow multiple poll answers
        #[arg(long)]
        multiple_answers: bool,

        /// Fire time as HH:MM in the configured zone; repeat to schedule
        /// the same content at several times
        #[arg(long, required = true)]
        time: Vec<TimeOfDay>,

        /// Re-arm every day after firing instead of firing once
        #[arg(long)]
        daily: bool,
    },

    /// List pending jobs
    List {
        /// Output format (table, json)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Cancel a job by id
    Cancel {
        /// Job id as shown by list
        id: u64,
    },

    /// Cancel every pending job
    CancelAll,

    /// Set the default target channel
    SetChannel {
        /// Channel identifier (e.g. "@mychannel" or "-100...")
        channel: String,
    },
}
