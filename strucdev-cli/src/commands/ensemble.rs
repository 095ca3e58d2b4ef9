use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use strucdev_core::Summarizable;
use strucdev_struct::{
    analyze_ensemble, extract_points_file, file_label, select_points, split_models,
    EnsembleReport, PointSet, RmsdMode, Selection,
};

use super::{check_report, prefixed_sibling, require_csv, FilterArgs};

#[derive(Args, Debug)]
pub struct EnsembleArgs {
    /// Directory of member PDB files, or one multi-model PDB file
    pub input: PathBuf,

    /// Reference structure (e.g. the crystal structure)
    #[arg(short, long)]
    pub reference: Option<PathBuf>,

    /// Summary CSV; deviation_ and diversity_ tables are written next to it
    #[arg(short, long)]
    pub output: PathBuf,

    /// Use every atom instead of the backbone
    #[arg(long)]
    pub all_atom: bool,

    /// Measure in the input frame without superposing first
    #[arg(long)]
    pub no_superpose: bool,

    /// Also dump the full report as JSON
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    #[command(flatten)]
    pub filter: FilterArgs,
}

impl EnsembleArgs {
    fn selection(&self) -> Selection {
        let base = if self.all_atom {
            Selection::all_atoms()
        } else {
            Selection::backbone()
        };
        self.filter.apply(base)
    }
}

/// Member point sets, skipping (with a warning) any member that cannot be read.
fn load_members(input: &Path, selection: &Selection) -> Result<Vec<PointSet>> {
    let mut members = Vec::new();
    if input.is_dir() {
        for path in strucdev_io::list_pdb_files(input)? {
            match extract_points_file(&path, selection) {
                Ok(set) => members.push(set),
                Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
            }
        }
    } else {
        let text = std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read {}", input.display()))?;
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_label(input));
        let models = split_models(&text)
            .with_context(|| format!("Failed to split models of {}", input.display()))?;
        for model in models {
            let label = format!("{}_model_{}", stem, model.serial);
            match model
                .structure()
                .and_then(|s| select_points(&s, selection, label.clone()))
            {
                Ok(set) => members.push(set),
                Err(e) => log::warn!("Skipping {}: {}", label, e),
            }
        }
    }
    Ok(members)
}

pub fn compute(args: &EnsembleArgs) -> Result<EnsembleReport> {
    let selection = args.selection();
    let mode = if args.no_superpose {
        RmsdMode::InPlace
    } else {
        RmsdMode::Superposed
    };

    let reference = args
        .reference
        .as_ref()
        .map(|path| {
            extract_points_file(path, &selection)
                .with_context(|| format!("Failed to load reference {}", path.display()))
        })
        .transpose()?;

    let members = load_members(&args.input, &selection)?;
    if members.is_empty() {
        bail!("no usable ensemble members found in {}", args.input.display());
    }
    log::info!(
        "{} member(s), {} selection, {} point(s) each",
        members.len(),
        selection.describe(),
        reference.as_ref().unwrap_or(&members[0]).len()
    );

    let report = analyze_ensemble(reference.as_ref(), members, mode)
        .context("Ensemble comparison failed")?;
    for r in &report.rejected {
        log::warn!("Skipping {}: {}", r.member, r.reason);
    }
    if report.members.is_empty() {
        bail!("every ensemble member in {} was rejected", args.input.display());
    }
    if report.reference.is_none() {
        log::warn!("No reference given; deviation is left empty");
    }
    Ok(report)
}

pub fn run(args: EnsembleArgs) -> Result<()> {
    require_csv(&args.output)?;
    let report = compute(&args)?;

    let deviation_path = prefixed_sibling(&args.output, "deviation_");
    let diversity_path = prefixed_sibling(&args.output, "diversity_");
    strucdev_io::write_deviation_csv(&deviation_path, &report.deviation)
        .with_context(|| format!("Failed to write {}", deviation_path.display()))?;
    strucdev_io::write_diversity_csv(&diversity_path, &report.diversity)
        .with_context(|| format!("Failed to write {}", diversity_path.display()))?;
    strucdev_io::write_summary_csv(&args.output, &report)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    check_report(&deviation_path, report.deviation.len())?;
    check_report(&diversity_path, report.diversity.len())?;
    check_report(&args.output, 1)?;
    if let Some(json) = &args.json {
        strucdev_io::write_ensemble_json(json, &report)
            .with_context(|| format!("Failed to write {}", json.display()))?;
    }

    log::info!("{}", report.summary());
    println!(
        "Deviation: {:.3} Å  Diversity: {:.3} Å",
        report.mean_deviation, report.mean_diversity
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{dipeptide, write};
    use tempfile::tempdir;

    fn args(input: PathBuf, reference: Option<PathBuf>, output: PathBuf) -> EnsembleArgs {
        EnsembleArgs {
            input,
            reference,
            output,
            all_atom: false,
            no_superpose: false,
            json: None,
            filter: FilterArgs::default(),
        }
    }

    #[test]
    fn directory_ensemble_writes_three_reports() {
        let dir = tempdir().unwrap();
        let members = dir.path().join("members");
        std::fs::create_dir(&members).unwrap();
        for (i, dx) in [0.0, 1.0, 2.0].iter().enumerate() {
            write(&members, &format!("m{}.pdb", i + 1), &dipeptide(*dx, 90.0));
        }
        // Not a structure; skipped with a warning.
        write(&members, "broken.pdb", "REMARK nothing here\n");
        let reference = write(dir.path(), "xtal.pdb", &dipeptide(5.0, 90.0));
        let output = dir.path().join("out.csv");

        let mut a = args(members, Some(reference), output.clone());
        a.json = Some(dir.path().join("out.json"));
        run(a).unwrap();

        let dev = strucdev_io::parse_csv_info(dir.path().join("deviation_out.csv")).unwrap();
        assert_eq!(dev.row_count, 3);
        let div = strucdev_io::parse_csv_info(dir.path().join("diversity_out.csv")).unwrap();
        assert_eq!(div.row_count, 3);
        let (header, rows) = strucdev_io::read_rows(&output).unwrap();
        assert_eq!(header, vec!["Deviation", "Diversity"]);
        assert_eq!(rows[0], vec!["0.0", "0.0"]);
        assert!(dir.path().join("out.json").exists());
    }

    #[test]
    fn multi_model_file_is_split_in_memory() {
        let dir = tempdir().unwrap();
        let mut text = String::new();
        for (n, dx) in [(1, 0.0), (2, 0.5)] {
            text.push_str(&format!("MODEL     {:>4}\n", n));
            for line in dipeptide(dx, 90.0).lines().filter(|l| l.starts_with("ATOM")) {
                text.push_str(line);
                text.push('\n');
            }
            text.push_str("ENDMDL\n");
        }
        let input = write(dir.path(), "ens.pdb", &text);

        let mut a = args(input, None, dir.path().join("out.csv"));
        a.no_superpose = true;
        let report = compute(&a).unwrap();
        assert_eq!(report.members, vec!["ens_model_1", "ens_model_2"]);
        assert!(report.deviation.is_empty());
        assert!((report.mean_diversity - 0.5).abs() < 1e-3);
    }

    #[test]
    fn collapsed_member_is_skipped() {
        let dir = tempdir().unwrap();
        write(dir.path(), "m1.pdb", &dipeptide(0.0, 90.0));
        write(dir.path(), "m3.pdb", &dipeptide(1.0, 90.0));
        let collapsed: String = dipeptide(0.0, 90.0)
            .lines()
            .map(|l| {
                if l.starts_with("ATOM") {
                    format!("{}{:>8.3}{:>8.3}{:>8.3}{}\n", &l[..30], 2.0, 2.0, 2.0, &l[54..])
                } else {
                    format!("{}\n", l)
                }
            })
            .collect();
        write(dir.path(), "m2.pdb", &collapsed);

        let a = args(dir.path().to_path_buf(), None, dir.path().join("out.csv"));
        let report = compute(&a).unwrap();
        assert_eq!(report.members, vec!["m1.pdb", "m3.pdb"]);
        assert_eq!(report.rejected[0].member, "m2.pdb");
        assert_eq!(report.diversity.len(), 1);
    }

    #[test]
    fn output_must_be_csv() {
        let dir = tempdir().unwrap();
        let a = args(dir.path().to_path_buf(), None, dir.path().join("out.txt"));
        assert!(run(a).is_err());
    }

    #[test]
    fn unreadable_reference_aborts() {
        let dir = tempdir().unwrap();
        write(dir.path(), "m1.pdb", &dipeptide(0.0, 90.0));
        let a = args(
            dir.path().to_path_buf(),
            Some(dir.path().join("missing.pdb")),
            dir.path().join("out.csv"),
        );
        let err = compute(&a).unwrap_err();
        assert!(err.to_string().contains("missing.pdb"));
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let a = args(dir.path().to_path_buf(), None, dir.path().join("out.csv"));
        assert!(compute(&a).is_err());
    }
}
