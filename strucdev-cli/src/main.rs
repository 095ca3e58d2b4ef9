use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "strucdev")]
#[command(about = "Structural deviation and diversity of protein ensembles", long_about = None)]
#[command(version)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Less log output (-q warnings only, -qq errors only)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// RMSD between two structures
    Rmsd(commands::rmsd::RmsdArgs),
    /// Deviation from a reference and pairwise diversity of an ensemble
    Ensemble(commands::ensemble::EnsembleArgs),
    /// Split multi-model PDB files into one file per model
    Split(commands::split::SplitArgs),
    /// Ring centroid distances and interplanar angles over a directory
    Stacking(commands::stacking::StackingArgs),
    /// pLDDT summary and filtering of predicted models
    Confidence(commands::confidence::ConfidenceArgs),
    /// Mean side-chain B-factor per residue
    #[command(name = "bfactor")]
    BFactor(commands::bfactor::BFactorArgs),
}

fn log_level(verbose: u8, quiet: u8) -> &'static str {
    match (verbose, quiet) {
        (0, 0) => "info",
        (1, _) => "debug",
        (v, _) if v >= 2 => "trace",
        (_, 1) => "warn",
        _ => "error",
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG still wins over the flags.
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level(cli.verbose, cli.quiet)),
    )
    .format_timestamp_millis()
    .init();

    match cli.command {
        Commands::Rmsd(args) => commands::rmsd::run(args),
        Commands::Ensemble(args) => commands::ensemble::run(args),
        Commands::Split(args) => commands::split::run(args),
        Commands::Stacking(args) => commands::stacking::run(args),
        Commands::Confidence(args) => commands::confidence::run(args),
        Commands::BFactor(args) => commands::bfactor::run(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(log_level(0, 0), "info");
        assert_eq!(log_level(1, 0), "debug");
        assert_eq!(log_level(3, 0), "trace");
        assert_eq!(log_level(0, 1), "warn");
        assert_eq!(log_level(0, 2), "error");
    }

    #[test]
    fn parses_ensemble_invocation() {
        let cli = Cli::try_parse_from([
            "strucdev",
            "-q",
            "ensemble",
            "--reference",
            "xtal.pdb",
            "ens/",
            "--output",
            "out.csv",
            "--all-atom",
        ])
        .unwrap();
        assert_eq!(cli.quiet, 1);
        match cli.command {
            Commands::Ensemble(args) => {
                assert!(args.all_atom);
                assert_eq!(args.output.to_str(), Some("out.csv"));
            }
            _ => panic!("expected the ensemble subcommand"),
        }
    }

    #[test]
    fn parses_bfactor_invocation() {
        let cli = Cli::try_parse_from([
            "strucdev", "bfactor", "model.pdb", "out.csv", "--first", "4", "--last", "301",
            "--chain", "A",
        ])
        .unwrap();
        match cli.command {
            Commands::BFactor(args) => {
                assert_eq!(args.first, Some(4));
                assert_eq!(args.last, Some(301));
                assert_eq!(args.filter.chains, vec!['A']);
            }
            _ => panic!("expected the bfactor subcommand"),
        }
    }
}
