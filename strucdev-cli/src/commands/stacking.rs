use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use strucdev_struct::{
    file_label, parse_atom_groups, parse_pdb_file, stacking_pairs, StackingPair,
};

use super::{check_report, require_csv};

#[derive(Args, Debug)]
pub struct StackingArgs {
    /// Directory of PDB files
    pub dir: PathBuf,

    /// Output CSV
    pub output: PathBuf,

    /// Ring atom groups, e.g. "[['A48CG','A48CD2',...],['A301C5',...]]"
    /// or "PHE48=A48CG,A48CD2,...;LIG=A301C5,..."
    pub groups: String,
}

/// One `(file name, ring pair)` row per structure and group pair.
pub fn compute(args: &StackingArgs) -> Result<Vec<(String, StackingPair)>> {
    let groups = parse_atom_groups(&args.groups).context("Invalid atom group specification")?;
    if groups.len() < 2 {
        bail!("need at least two atom groups, got {}", groups.len());
    }

    let mut rows = Vec::new();
    for path in strucdev_io::list_pdb_files(&args.dir)? {
        let label = file_label(&path);
        let pairs = parse_pdb_file(&path).and_then(|s| stacking_pairs(&s, &groups));
        match pairs {
            Ok(pairs) => rows.extend(pairs.into_iter().map(|p| (label.clone(), p))),
            Err(e) => log::warn!("Skipping {}: {}", label, e),
        }
    }
    Ok(rows)
}

pub fn run(args: StackingArgs) -> Result<()> {
    require_csv(&args.output)?;
    let rows = compute(&args)?;
    strucdev_io::write_stacking_csv(&args.output, &rows)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    check_report(&args.output, rows.len())?;
    Ok(())
}
