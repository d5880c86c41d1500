mod config;
mod fetch;
mod list;
mod output;
mod progress;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use config::SvdgrabConfig;
use output::{Output, Verbosity};

#[derive(Parser, Debug)]
#[command(name = "svdgrab")]
#[command(version, about = "Fetch SVD device descriptions from CMSIS pack indexes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file (default: svdgrab.toml, then ~/.svdgrab.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the vendors of the pack index and their pack versions
    List(list::ListArgs),

    /// Download the packs of a vendor and extract their SVD files
    Fetch(fetch::FetchArgs),
}

fn init_logger(verbosity: Verbosity) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(verbosity.log_filter()))
        .format_timestamp(None)
        .init();
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    init_logger(verbosity);

    let config = SvdgrabConfig::resolve(cli.config.as_deref())?;
    let mut output = Output::new(verbosity);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| anyhow::anyhow!("Failed to create async runtime: {}", e))?;

    match cli.command {
        Commands::List(args) => rt.block_on(list::execute(args, &config, &mut output)),
        Commands::Fetch(args) => rt.block_on(fetch::execute(args, &config, &output)),
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("Error: {}", e);
            for cause in e.chain().skip(1) {
                eprintln!("  Caused by: {}", cause);
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fetch_flags() {
        let cli = Cli::try_parse_from([
            "svdgrab", "-vv", "fetch", "--vendor", "Acme", "--path", "out", "--pack", "1.2.3", "--match", "widget",
            "--marker", "SVD", "--remove-archives",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Commands::Fetch(args) = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(args.vendor, "Acme");
        assert_eq!(args.path, Some(PathBuf::from("out")));
        assert_eq!(args.version.as_deref(), Some("1.2.3"));
        assert_eq!(args.name_filter.as_deref(), Some("widget"));
        assert!(args.remove_archives);
    }

    #[test]
    fn test_fetch_requires_vendor() {
        assert!(Cli::try_parse_from(["svdgrab", "fetch"]).is_err());
    }

    #[test]
    fn test_parse_list_json() {
        let cli = Cli::try_parse_from(["svdgrab", "list", "--format", "json", "-q"]).unwrap();
        assert!(cli.quiet);
        let Commands::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.format, list::ListFormat::Json);
        assert!(args.index.is_none());
    }
}
