use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use strucdev_struct::split_file;

#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Multi-model PDB file, or a directory of them
    pub input: PathBuf,

    /// Write members here instead of next to each input
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

/// Split every input file; returns the written member paths.
pub fn split_all(args: &SplitArgs) -> Result<Vec<PathBuf>> {
    if let Some(dir) = &args.out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let inputs = strucdev_io::expand_input(&args.input)?;
    let mut written = Vec::new();
    for path in inputs {
        let members = split_file(&path, args.out_dir.as_deref())
            .with_context(|| format!("Failed to split {}", path.display()))?;
        if members.len() < 2 {
            log::warn!(
                "Only one model found in {}; check its MODEL/ENDMDL records",
                path.display()
            );
        } else {
            log::info!("{}: {} models", path.display(), members.len());
        }
        written.extend(members);
    }
    Ok(written)
}

pub fn run(args: SplitArgs) -> Result<()> {
    let written = split_all(&args)?;
    if let (Some(first), Some(last)) = (written.first(), written.last()) {
        println!(
            "Wrote {} file(s): {} .. {}",
            written.len(),
            first.display(),
            last.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{dipeptide, write};
    use tempfile::tempdir;

    fn ensemble(models: usize) -> String {
        let mut text = String::from("REMARK   SPLIT TEST\n");
        for n in 1..=models {
            text.push_str(&format!("MODEL     {:>4}\n", n));
            for line in dipeptide(n as f64, 80.0).lines().filter(|l| l.starts_with("ATOM")) {
                text.push_str(line);
                text.push('\n');
            }
            text.push_str("ENDMDL\n");
        }
        text.push_str("END\n");
        text
    }

    #[test]
    fn splits_into_out_dir() {
        let dir = tempdir().unwrap();
        let input = write(dir.path(), "ens.pdb", &ensemble(3));
        let out = dir.path().join("members");
        let written = split_all(&SplitArgs {
            input,
            out_dir: Some(out.clone()),
        })
        .unwrap();
        assert_eq!(written.len(), 3);
        assert_eq!(written[2], out.join("ens_model_3.pdb"));
        let member = std::fs::read_to_string(&written[0]).unwrap();
        assert!(member.starts_with("REMARK"));
        assert_eq!(strucdev_struct::parse_pdb(&member).unwrap().atoms.len(), 9);
    }

    #[test]
    fn splits_every_file_in_a_directory() {
        let dir = tempdir().unwrap();
        write(dir.path(), "a.pdb", &ensemble(2));
        write(dir.path(), "b.pdb", &ensemble(1));
        let written = split_all(&SplitArgs {
            input: dir.path().to_path_buf(),
            out_dir: Some(dir.path().join("out")),
        })
        .unwrap();
        assert_eq!(written.len(), 3);
    }

    #[test]
    fn stray_endmdl_fails() {
        let dir = tempdir().unwrap();
        let input = write(dir.path(), "bad.pdb", "REMARK\nENDMDL\n");
        let err = split_all(&SplitArgs {
            input,
            out_dir: None,
        })
        .unwrap_err();
        assert!(format!("{:#}", err).contains("ENDMDL"));
    }
}
