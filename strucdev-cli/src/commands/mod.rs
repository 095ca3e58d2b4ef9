pub mod bfactor;
pub mod confidence;
pub mod ensemble;
pub mod rmsd;
pub mod split;
pub mod stacking;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use strucdev_io::CsvInfo;
use strucdev_struct::{file_label, AltLocPolicy, Selection};

/// Atom filters shared by the commands that read coordinates or B-factors.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Restrict to a chain (repeatable)
    #[arg(long = "chain", value_name = "ID")]
    pub chains: Vec<char>,

    /// Keep only blank or 'A' alternate locations
    #[arg(long)]
    pub primary_altloc: bool,

    /// Drop hydrogen atoms
    #[arg(long)]
    pub no_hydrogens: bool,

    /// Also read HETATM records
    #[arg(long)]
    pub hetatm: bool,
}

impl FilterArgs {
    pub fn apply(&self, selection: Selection) -> Selection {
        let mut selection = selection
            .with_chains(self.chains.clone())
            .with_hetatm(self.hetatm);
        if self.primary_altloc {
            selection = selection.with_alt_locs(AltLocPolicy::Primary);
        }
        if self.no_hydrogens {
            selection = selection.without_hydrogens();
        }
        selection
    }
}

/// `<dir>/<prefix><name>` for an output path `<dir>/<name>`.
pub fn prefixed_sibling(path: &Path, prefix: &str) -> PathBuf {
    path.with_file_name(format!("{}{}", prefix, file_label(path)))
}

pub fn require_csv(path: &Path) -> Result<()> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if !is_csv {
        bail!("output file must have a .csv extension: {}", path.display());
    }
    Ok(())
}

/// Read a freshly written report back and check its row count.
pub fn check_report(path: &Path, expected_rows: usize) -> Result<CsvInfo> {
    let info = strucdev_io::parse_csv_info(path)
        .with_context(|| format!("Failed to read back {}", path.display()))?;
    if info.row_count != expected_rows as u64 {
        bail!(
            "{} holds {} row(s), expected {}",
            path.display(),
            info.row_count,
            expected_rows
        );
    }
    log::info!(
        "Wrote {} ({} row(s): {})",
        path.display(),
        info.row_count,
        info.columns.join(",")
    );
    Ok(info)
}
