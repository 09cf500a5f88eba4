use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "courier", about = "Courier messaging backend", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Validate a config file and print the effective settings
    CheckConfig(CheckConfigArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML config file; defaults apply when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Overrides `bind_addr` from the config
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Args)]
pub struct CheckConfigArgs {
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve_defaults() {
        let cli = Cli::try_parse_from(["courier", "serve"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert!(args.config.is_none());
            assert!(args.bind.is_none());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_serve_with_overrides() {
        let cli = Cli::try_parse_from([
            "courier",
            "serve",
            "--config",
            "courier.toml",
            "--bind",
            "0.0.0.0:9000",
        ])
        .unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.config, Some(PathBuf::from("courier.toml")));
            assert_eq!(args.bind.unwrap().port(), 9000);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_check_config() {
        let cli = Cli::try_parse_from(["courier", "-v", "check-config", "c.toml"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::CheckConfig(_)));
    }

    #[test]
    fn bad_bind_rejected() {
        assert!(Cli::try_parse_from(["courier", "serve", "--bind", "nowhere"]).is_err());
    }
}
