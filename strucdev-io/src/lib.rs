//! Report output and input discovery for the strucdev toolkit.
//!
//! - **CSV reports**: deviation, diversity, summary, stacking, confidence and
//!   per-residue B-factor tables in [`csv`], plus a JSON dump of a whole ensemble report
//! - **Discovery**: sorted `.pdb` listings of a directory in [`discover`]

pub mod csv;
pub mod discover;

// Re-exports for convenience.

pub use csv::{
    parse_csv_info, read_rows, round_to, write_bfactor_csv, write_confidence_csv,
    write_deviation_csv, write_diversity_csv, write_ensemble_json, write_stacking_csv,
    write_summary_csv, CsvInfo, BFACTOR_DECIMALS, CONFIDENCE_DECIMALS, RMSD_DECIMALS,
};
pub use discover::{expand_input, is_pdb_path, list_pdb_files};
