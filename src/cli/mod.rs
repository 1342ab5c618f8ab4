//! CLI module - Command-line interface for BarScore
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

use crate::domain::Category;

/// BarScore - Battle rap performer ratings
#[derive(Parser)]
#[command(name = "barscore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the API server and background scheduler (default)
    #[command(alias = "daemon")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Rebuild every analytics view now
    RefreshAnalytics,

    /// Print the current leaderboard
    #[command(alias = "lb")]
    Leaderboard {
        /// Rank by a single category instead of the total score
        #[arg(long, value_parser = parse_category)]
        category: Option<Category>,
        /// Number of entries to show
        #[arg(long, default_value = "20")]
        limit: u64,
    },

    /// Run the news pipeline
    News {
        #[command(subcommand)]
        command: NewsCommands,
    },

    /// Inspect or reset role weights
    RoleWeights {
        #[command(subcommand)]
        command: RoleWeightCommands,
    },
}

#[derive(Subcommand)]
pub enum NewsCommands {
    /// Generate draft articles from the configured accounts
    Generate,
}

#[derive(Subcommand)]
pub enum RoleWeightCommands {
    /// Show current and default weights
    Show,
    /// Restore the default weights and refresh scores
    Reset,
}

fn parse_category(value: &str) -> Result<Category, String> {
    value.to_ascii_lowercase().parse()
}

pub use commands::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let cli = Cli::try_parse_from(["barscore"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_leaderboard_args() {
        let cli = Cli::try_parse_from(["barscore", "leaderboard", "--category", "Writing"]).unwrap();
        match cli.command {
            Some(Commands::Leaderboard { category, limit }) => {
                assert_eq!(category, Some(Category::Writing));
                assert_eq!(limit, 20);
            }
            _ => panic!("expected leaderboard command"),
        }

        assert!(Cli::try_parse_from(["barscore", "leaderboard", "--category", "flow"]).is_err());
    }

    #[test]
    fn test_nested_subcommands() {
        let cli = Cli::try_parse_from(["barscore", "role-weights", "reset"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::RoleWeights {
                command: RoleWeightCommands::Reset
            })
        ));

        let cli = Cli::try_parse_from(["barscore", "news", "generate"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::News {
                command: NewsCommands::Generate
            })
        ));
    }
}
