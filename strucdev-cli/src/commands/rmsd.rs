use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use strucdev_struct::{extract_points_file, RmsdMode, Selection};

use super::FilterArgs;

#[derive(Args, Debug)]
pub struct RmsdArgs {
    /// Mobile structure
    pub first: PathBuf,

    /// Target structure
    pub second: PathBuf,

    /// Compare N, CA, C and O only
    #[arg(long, conflicts_with = "side_chain")]
    pub backbone: bool,

    /// Compare everything except N, CA, C and O
    #[arg(long)]
    pub side_chain: bool,

    /// Measure in the input frame without superposing first
    #[arg(long)]
    pub no_superpose: bool,

    #[command(flatten)]
    pub filter: FilterArgs,
}

impl RmsdArgs {
    fn selection(&self) -> Selection {
        let base = if self.backbone {
            Selection::backbone()
        } else if self.side_chain {
            Selection::side_chain()
        } else {
            Selection::all_atoms()
        };
        self.filter.apply(base)
    }

    fn mode(&self) -> RmsdMode {
        if self.no_superpose {
            RmsdMode::InPlace
        } else {
            RmsdMode::Superposed
        }
    }
}

/// RMSD of the two structures under the requested selection.
pub fn compute(args: &RmsdArgs) -> Result<f64> {
    let selection = args.selection();
    let first = extract_points_file(&args.first, &selection)
        .with_context(|| format!("Failed to extract coordinates from {}", args.first.display()))?;
    let second = extract_points_file(&args.second, &selection)
        .with_context(|| format!("Failed to extract coordinates from {}", args.second.display()))?;
    log::debug!(
        "{}: {} point(s), {}: {} point(s)",
        first.label,
        first.len(),
        second.label,
        second.len()
    );
    args.mode()
        .rmsd(&first, &second)
        .with_context(|| format!("Cannot compare {} with {}", first.label, second.label))
}

pub fn run(args: RmsdArgs) -> Result<()> {
    let rmsd = compute(&args)?;
    println!("{} RMSD: {:.3} Å", args.selection().describe(), rmsd);
    Ok(())
}
