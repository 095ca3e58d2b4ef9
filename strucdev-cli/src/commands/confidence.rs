use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use strucdev_struct::{
    assess_model, file_label, parse_pdb_file, ConfidenceReport, ConfidenceThresholds,
};

use super::{check_report, require_csv};

#[derive(Args, Debug)]
pub struct ConfidenceArgs {
    /// Directory of predicted models
    pub dir: PathBuf,

    /// Output CSV
    pub output: PathBuf,

    /// Design the models are compared with (backbone RMSD)
    #[arg(short, long)]
    pub reference: Option<PathBuf>,

    /// Copy models that pass every threshold here
    #[arg(long, value_name = "DIR")]
    pub filtered_dir: Option<PathBuf>,

    /// Minimum mean pLDDT
    #[arg(long, default_value_t = 80.0)]
    pub min_mean: f64,

    /// Minimum median pLDDT
    #[arg(long, default_value_t = 80.0)]
    pub min_median: f64,

    /// Minimum mean of the five lowest pLDDT values
    #[arg(long, default_value_t = 45.0)]
    pub min_low_mean: f64,

    /// Maximum backbone RMSD (Å)
    #[arg(long, default_value_t = 3.0)]
    pub max_rmsd: f64,
}

impl ConfidenceArgs {
    fn thresholds(&self) -> ConfidenceThresholds {
        ConfidenceThresholds {
            min_mean: self.min_mean,
            min_median: self.min_median,
            min_low_mean: self.min_low_mean,
            max_rmsd: self.max_rmsd,
        }
    }
}

fn model_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_label(path))
}

/// Assess every model; returns each report with its source path.
pub fn compute(args: &ConfidenceArgs) -> Result<Vec<(PathBuf, ConfidenceReport)>> {
    let reference = args
        .reference
        .as_ref()
        .map(|path| {
            parse_pdb_file(path)
                .with_context(|| format!("Failed to load reference {}", path.display()))
        })
        .transpose()?;

    let mut reports = Vec::new();
    for path in strucdev_io::list_pdb_files(&args.dir)? {
        let label = model_label(&path);
        let report = parse_pdb_file(&path)
            .and_then(|model| assess_model(&model, label.clone(), reference.as_ref()));
        match report {
            Ok(r) => reports.push((path, r)),
            Err(e) => log::warn!("Skipping {}: {}", label, e),
        }
    }
    Ok(reports)
}

pub fn run(args: ConfidenceArgs) -> Result<()> {
    require_csv(&args.output)?;
    let thresholds = args.thresholds();
    let assessed = compute(&args)?;

    if let Some(dir) = &args.filtered_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let mut passed = 0;
    for (path, report) in &assessed {
        if !report.passes(&thresholds) {
            log::debug!("{} below thresholds", report.model);
            continue;
        }
        passed += 1;
        if let Some(dir) = &args.filtered_dir {
            let dest = dir.join(file_label(path));
            std::fs::copy(path, &dest)
                .with_context(|| format!("Failed to copy {} to {}", path.display(), dest.display()))?;
        }
    }

    let reports: Vec<ConfidenceReport> = assessed.into_iter().map(|(_, r)| r).collect();
    strucdev_io::write_confidence_csv(&args.output, &reports)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    check_report(&args.output, reports.len())?;
    log::info!("{} of {} model(s) pass the thresholds", passed, reports.len());
    Ok(())
}
