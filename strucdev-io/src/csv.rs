//! CSV report writers and readers.
//!
//! Every report is one header row followed by one row per comparison. RMSD
//! values are rounded to [`RMSD_DECIMALS`], confidence values to
//! [`CONFIDENCE_DECIMALS`].

use std::fs::File;
use std::path::Path;

use ::csv::{ReaderBuilder, Writer, WriterBuilder};
use serde::Serialize;
use strucdev_core::{Result, StrucdevError};
use strucdev_struct::{
    ConfidenceReport, EnsembleReport, MemberDeviation, PairDiversity, ResidueBFactor,
    StackingPair,
};

pub const RMSD_DECIMALS: i32 = 3;
pub const CONFIDENCE_DECIMALS: i32 = 2;
pub const BFACTOR_DECIMALS: i32 = 3;

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[derive(Debug, Serialize)]
struct DeviationRow<'a> {
    member: &'a str,
    rmsd: f64,
}

#[derive(Debug, Serialize)]
struct DiversityRow<'a> {
    member_a: &'a str,
    member_b: &'a str,
    rmsd: f64,
}

#[derive(Debug, Serialize)]
struct SummaryRow {
    deviation: f64,
    diversity: f64,
}

#[derive(Debug, Serialize)]
struct StackingRow<'a> {
    pdb: &'a str,
    group_1: &'a str,
    group_2: &'a str,
    distance: f64,
    angle: f64,
}

#[derive(Debug, Serialize)]
struct ConfidenceRow<'a> {
    model: &'a str,
    mean_plddt: f64,
    median_plddt: f64,
    lowest5_plddt: f64,
    backbone_rmsd: f64,
}

#[derive(Debug, Serialize)]
struct BFactorRow<'a> {
    pdb: &'a str,
    chain: char,
    res_seq: i32,
    i_code: Option<char>,
    res_name: &'a str,
    atoms: usize,
    mean_bfactor: f64,
}

fn create(path: &Path) -> Result<Writer<File>> {
    let file = File::create(path).map_err(|e| {
        StrucdevError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    Ok(WriterBuilder::new().has_headers(false).from_writer(file))
}

/// Write `header`, then one serialized row per item. The header is explicit
/// so that empty reports still name their columns.
fn write_rows<T: Serialize>(
    path: &Path,
    header: &[&str],
    rows: impl IntoIterator<Item = T>,
) -> Result<()> {
    let mut writer = create(path)?;
    writer
        .write_record(header)
        .map_err(|e| StrucdevError::Format(format!("{}: {}", path.display(), e)))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| StrucdevError::Format(format!("{}: {}", path.display(), e)))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `member,rmsd` rows.
pub fn write_deviation_csv(path: impl AsRef<Path>, deviation: &[MemberDeviation]) -> Result<()> {
    write_rows(
        path.as_ref(),
        &["member", "rmsd"],
        deviation.iter().map(|d| DeviationRow {
            member: &d.member,
            rmsd: round_to(d.rmsd, RMSD_DECIMALS),
        }),
    )
}

/// Write `member_a,member_b,rmsd` rows.
pub fn write_diversity_csv(path: impl AsRef<Path>, diversity: &[PairDiversity]) -> Result<()> {
    write_rows(
        path.as_ref(),
        &["member_a", "member_b", "rmsd"],
        diversity.iter().map(|d| DiversityRow {
            member_a: &d.first,
            member_b: &d.second,
            rmsd: round_to(d.rmsd, RMSD_DECIMALS),
        }),
    )
}

/// Write the single `Deviation,Diversity` row of mean values.
pub fn write_summary_csv(path: impl AsRef<Path>, report: &EnsembleReport) -> Result<()> {
    write_rows(
        path.as_ref(),
        &["Deviation", "Diversity"],
        [SummaryRow {
            deviation: round_to(report.mean_deviation, RMSD_DECIMALS),
            diversity: round_to(report.mean_diversity, RMSD_DECIMALS),
        }],
    )
}

/// Write one row per structure and ring pair.
pub fn write_stacking_csv(path: impl AsRef<Path>, rows: &[(String, StackingPair)]) -> Result<()> {
    write_rows(
        path.as_ref(),
        &["pdb", "group_1", "group_2", "distance", "angle"],
        rows.iter().map(|(pdb, pair)| StackingRow {
            pdb,
            group_1: &pair.first,
            group_2: &pair.second,
            distance: round_to(pair.distance, RMSD_DECIMALS),
            angle: round_to(pair.angle, RMSD_DECIMALS),
        }),
    )
}

/// Write one row per assessed model.
pub fn write_confidence_csv(path: impl AsRef<Path>, reports: &[ConfidenceReport]) -> Result<()> {
    write_rows(
        path.as_ref(),
        &["model", "mean_plddt", "median_plddt", "lowest5_plddt", "backbone_rmsd"],
        reports.iter().map(|r| ConfidenceRow {
            model: &r.model,
            mean_plddt: round_to(r.stats.mean, CONFIDENCE_DECIMALS),
            median_plddt: round_to(r.stats.median, CONFIDENCE_DECIMALS),
            lowest5_plddt: round_to(r.stats.low_mean, CONFIDENCE_DECIMALS),
            backbone_rmsd: round_to(r.backbone_rmsd, CONFIDENCE_DECIMALS),
        }),
    )
}

/// Write one row per structure and residue.
pub fn write_bfactor_csv(
    path: impl AsRef<Path>,
    rows: &[(String, ResidueBFactor)],
) -> Result<()> {
    write_rows(
        path.as_ref(),
        &["pdb", "chain", "res_seq", "i_code", "res_name", "atoms", "mean_bfactor"],
        rows.iter().map(|(pdb, r)| BFactorRow {
            pdb,
            chain: r.chain,
            res_seq: r.res_seq,
            i_code: r.i_code,
            res_name: &r.res_name,
            atoms: r.atoms,
            mean_bfactor: round_to(r.mean, BFACTOR_DECIMALS),
        }),
    )
}

/// Pretty-printed JSON of a whole ensemble report.
pub fn write_ensemble_json(path: impl AsRef<Path>, report: &EnsembleReport) -> Result<()> {
    let path = path.as_ref();
    let text = serde_json::to_string_pretty(report)
        .map_err(|e| StrucdevError::Format(e.to_string()))?;
    std::fs::write(path, text).map_err(|e| {
        StrucdevError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })
}

/// Shape of a CSV report on disk.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CsvInfo {
    pub row_count: u64,
    pub columns: Vec<String>,
}

/// Read a report's header and count its data rows.
pub fn parse_csv_info(path: impl AsRef<Path>) -> Result<CsvInfo> {
    let rows = read_rows(path)?;
    Ok(CsvInfo {
        row_count: rows.1.len() as u64,
        columns: rows.0,
    })
}

/// Header and data rows of a CSV report, as strings.
pub fn read_rows(path: impl AsRef<Path>) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        StrucdevError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| StrucdevError::Parse(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| StrucdevError::Parse(e.to_string()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok((headers, rows))
}
