//! Structural deviation and diversity for macromolecular ensembles.
//!
//! - **Coordinate extraction**: fixed-column PDB parsing and atom [`selection`] in [`pdb`]
//! - **Superposition**: Kabsch alignment and RMSD in [`superposition`]
//! - **Ensembles**: per-member deviation and pairwise diversity in [`ensemble`]
//! - **Multi-model files**: MODEL/ENDMDL splitting in [`models`]
//! - **Ring stacking**: centroid distances and interplanar angles in [`stacking`]
//! - **Prediction confidence**: pLDDT summaries, filtering and per-residue
//!   B-factors in [`confidence`]
//!
//! # Quick start
//!
//! ```
//! use strucdev_struct::{extract_points, superposed_rmsd, Selection};
//!
//! let pdb_text = "\
//! HEADER                                                        1TST
//! ATOM      1  N   ALA A   1       1.000   2.000   3.000  1.00  0.00           N
//! ATOM      2  CA  ALA A   1       2.000   2.000   3.000  1.00  0.00           C
//! ATOM      3  C   ALA A   1       3.000   2.500   3.000  1.00  0.00           C
//! ATOM      4  O   ALA A   1       3.000   3.000   4.000  1.00  0.00           O
//! END
//! ";
//!
//! let a = extract_points(pdb_text, &Selection::backbone(), "a").unwrap();
//! let b = extract_points(pdb_text, &Selection::backbone(), "b").unwrap();
//! assert_eq!(a.len(), 4);
//! assert!(superposed_rmsd(&a, &b).unwrap() < 1e-6);
//! ```

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod confidence;
pub mod ensemble;
pub mod geometry;
mod linalg;
pub mod models;
pub mod pdb;
pub mod selection;
pub mod stacking;
pub mod superposition;
pub mod types;

pub use confidence::{
    assess_model, residue_bfactors, ConfidenceReport, ConfidenceThresholds, PlddtStats,
    ResidueBFactor,
};
pub use ensemble::{
    analyze_ensemble, deviation, diversity, mean, EnsembleReport, MemberDeviation, PairDiversity,
    MemberRejection, RmsdMode,
};
pub use geometry::{center_of_mass_points, rmsd_points};
pub use models::{model_point_sets, split_models, ModelMember};
pub use pdb::{extract_points, parse_pdb, select_points};
pub use selection::{AltLocPolicy, AtomFilter, Selection};
pub use stacking::{parse_atom_groups, stacking_pairs, AtomGroup, AtomSpec, StackingPair};
pub use superposition::{in_place_rmsd, kabsch_points, superposed_rmsd, SuperpositionResult};
pub use types::{Atom, Point3D, PointSet, RecordKind, Structure};

#[cfg(feature = "std")]
pub use models::split_file;
#[cfg(feature = "std")]
pub use pdb::{extract_points_file, file_label, parse_pdb_file, StructureRecord};
