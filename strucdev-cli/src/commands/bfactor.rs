use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use strucdev_struct::{file_label, parse_pdb_file, residue_bfactors, ResidueBFactor, Selection};

use super::{check_report, require_csv, FilterArgs};

#[derive(Args, Debug)]
pub struct BFactorArgs {
    /// PDB file, or a directory of them
    pub input: PathBuf,

    /// Output CSV
    pub output: PathBuf,

    /// First residue number to report
    #[arg(long, value_name = "RESSEQ")]
    pub first: Option<i32>,

    /// Last residue number to report
    #[arg(long, value_name = "RESSEQ")]
    pub last: Option<i32>,

    #[command(flatten)]
    pub filter: FilterArgs,
}

impl BFactorArgs {
    fn in_range(&self, residue: &ResidueBFactor) -> bool {
        self.first.map_or(true, |f| residue.res_seq >= f)
            && self.last.map_or(true, |l| residue.res_seq <= l)
    }
}

/// One `(file name, residue)` row per structure and residue.
pub fn compute(args: &BFactorArgs) -> Result<Vec<(String, ResidueBFactor)>> {
    let filter = args.filter.apply(Selection::all_atoms());
    let mut rows = Vec::new();
    for path in strucdev_io::expand_input(&args.input)? {
        let label = file_label(&path);
        let structure = match parse_pdb_file(&path) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("Skipping {}: {}", label, e);
                continue;
            }
        };
        let residues: Vec<ResidueBFactor> = residue_bfactors(&structure, &filter)
            .into_iter()
            .filter(|r| args.in_range(r))
            .collect();
        if residues.is_empty() {
            log::warn!("Skipping {}: no residues with side-chain atoms in range", label);
            continue;
        }
        log::debug!("{}: {} residue(s)", label, residues.len());
        rows.extend(residues.into_iter().map(|r| (label.clone(), r)));
    }
    Ok(rows)
}

pub fn run(args: BFactorArgs) -> Result<()> {
    require_csv(&args.output)?;
    let rows = compute(&args)?;
    strucdev_io::write_bfactor_csv(&args.output, &rows)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    check_report(&args.output, rows.len())?;
    Ok(())
}
