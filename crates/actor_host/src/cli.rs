//! Command-line interface handling for the actor host.
//!
//! Every option here overrides the matching setting of the configuration
//! file.

use clap::{value_parser, Arg, ArgMatches, Command};
use std::ffi::OsString;
use std::path::PathBuf;

/// Command line arguments parsed from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
    /// Optional override for the number of actors to spawn
    pub actors: Option<usize>,
    /// Optional override for the per-actor mailbox capacity
    pub mailbox_capacity: Option<usize>,
}

impl CliArgs {
    /// Parses the process arguments. Exits with usage on invalid input.
    pub fn parse() -> Self {
        Self::from_matches(&command().get_matches())
    }

    /// Parses an explicit argument list, first item being the binary name.
    pub fn parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Ok(Self::from_matches(&command().try_get_matches_from(args)?))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("config.toml")),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
            actors: matches.get_one::<usize>("actors").copied(),
            mailbox_capacity: matches.get_one::<usize>("mailbox-capacity").copied(),
        }
    }
}

fn command() -> Command {
    Command::new("Actor Host")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Hosts per-entity actors with priority-ordered event buses")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .help("Output logs in JSON format")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("actors")
                .short('a')
                .long("actors")
                .value_name("COUNT")
                .help("Number of actors to spawn at startup")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("mailbox-capacity")
                .short('m')
                .long("mailbox-capacity")
                .value_name("EVENTS")
                .help("Mailbox capacity of each spawned actor")
                .value_parser(value_parser!(usize)),
        )
}
