//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// tp - conversational task planner with Gantt layout
#[derive(Parser)]
#[command(
    name = "tp",
    about = "Turn a project conversation into a dated task plan and Gantt chart",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Plan a project conversation inside a date window
    Plan {
        /// Conversation file, or '-' for stdin
        #[arg(value_name = "CONVERSATION")]
        input: String,

        /// Project window start (YYYY-MM-DD)
        #[arg(short, long)]
        start: String,

        /// Project window end (YYYY-MM-DD)
        #[arg(short, long)]
        end: String,

        /// Reference time for status (defaults to local now)
        #[arg(long)]
        now: Option<String>,

        /// Skip the completion call and use the fallback template
        #[arg(long)]
        offline: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Lay out stored task records (JSON array) as a Gantt chart
    Layout {
        /// Task records file, or '-' for stdin
        #[arg(value_name = "TASKS")]
        input: String,

        /// Chart window start (defaults to the tasks' extent)
        #[arg(short, long, requires = "end")]
        start: Option<String>,

        /// Chart window end
        #[arg(short, long, requires = "start")]
        end: Option<String>,

        /// Reference time for status (defaults to local now)
        #[arg(long)]
        now: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List the fallback templates
    Templates,
}

/// Output format for plan and layout
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => {
                debug!(%s, "OutputFormat::from_str: unknown format");
                Err(format!("Unknown format: {}. Use text or json", s))
            }
        }
    }
}

/// Where the log file is written
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskplanner")
        .join("logs")
        .join("taskplanner.log")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_plan() {
        let cli = Cli::try_parse_from([
            "tp", "plan", "notes.txt", "--start", "2025-01-01", "--end", "2025-03-31", "--offline", "-f", "json",
        ])
        .unwrap();
        match cli.command {
            Command::Plan {
                input, offline, format, ..
            } => {
                assert_eq!(input, "notes.txt");
                assert!(offline);
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_layout_window_needs_both_ends() {
        assert!(Cli::try_parse_from(["tp", "layout", "t.json", "--start", "2025-01-01"]).is_err());
        assert!(Cli::try_parse_from(["tp", "layout", "t.json"]).is_ok());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("plain".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("table".parse::<OutputFormat>().is_err());
    }
}
