use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Second Bounce scanner for Solana tokens", long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Write log lines to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Evaluate the given token addresses
    Scan {
        #[arg(required = true)]
        addresses: Vec<String>,

        /// Print full results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Scan the top tokens by 24h volume and rank them
    Top {
        /// Number of tokens to pull from the list
        #[arg(short, long)]
        limit: Option<usize>,

        #[arg(long)]
        json: bool,
    },
    /// Show how tracked calls have performed since they were made
    Calls,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan() {
        let cli = Cli::try_parse_from(["bounce-scanner", "--debug", "scan", "AAA", "BBB", "--json"]).unwrap();
        assert!(cli.debug);
        assert_eq!(
            cli.command,
            Command::Scan {
                addresses: vec!["AAA".to_string(), "BBB".to_string()],
                json: true
            }
        );
    }

    #[test]
    fn test_parse_top_and_calls() {
        let cli = Cli::try_parse_from(["bounce-scanner", "-c", "alt.toml", "top", "--limit", "20"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
        assert_eq!(cli.command, Command::Top { limit: Some(20), json: false });

        let cli = Cli::try_parse_from(["bounce-scanner", "calls"]).unwrap();
        assert_eq!(cli.command, Command::Calls);
    }

    #[test]
    fn test_parse_log_file() {
        let cli = Cli::try_parse_from(["bounce-scanner", "--log-file", "scan.log", "scan", "AAA"]).unwrap();
        assert_eq!(cli.log_file, Some(PathBuf::from("scan.log")));

        let help = <Cli as clap::CommandFactory>::command()
            .get_arguments()
            .find(|arg| arg.get_id() == "log_file")
            .and_then(|arg| arg.get_help())
            .map(|help| help.to_string());
        assert_eq!(help.as_deref(), Some("Write log lines to this file instead of stderr"));
    }

    #[test]
    fn test_scan_requires_address() {
        assert!(Cli::try_parse_from(["bounce-scanner", "scan"]).is_err());
    }
}
