//! Prediction confidence (pLDDT) summaries and filtering.
//!
//! Structure predictors write per-residue pLDDT into the B-factor column.
//! The CA B-factors of a model, in file order, are summarised by their mean,
//! median and the mean of the five lowest values, and combined with a
//! backbone RMSD against a design reference to decide whether a model passes.
//!
//! [`residue_bfactors`] reads the same column per residue: the mean over a
//! residue's side-chain heavy atoms (backbone for glycine), for refinement
//! B-factors and predicted pLDDT alike.

use strucdev_core::{Result, StrucdevError};

use crate::pdb::select_points;
use crate::selection::{AtomFilter, Selection, BACKBONE_ATOMS};
use crate::superposition::superposed_rmsd;
use crate::types::Structure;

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// Number of lowest values averaged by [`PlddtStats::low_mean`].
pub const LOWEST_COUNT: usize = 5;

/// Summary statistics of per-residue pLDDT values.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlddtStats {
    pub mean: f64,
    pub median: f64,
    /// Mean of the [`LOWEST_COUNT`] lowest values (all of them when fewer).
    pub low_mean: f64,
}

impl PlddtStats {
    /// Summarise `values`. Returns `None` for an empty slice.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            0.5 * (sorted[n / 2 - 1] + sorted[n / 2])
        };
        let low = &sorted[..n.min(LOWEST_COUNT)];
        let low_mean = low.iter().sum::<f64>() / low.len() as f64;
        Some(Self {
            mean,
            median,
            low_mean,
        })
    }
}

/// CA B-factors of `structure`, in file order.
pub fn plddt_values(structure: &Structure) -> Vec<f64> {
    structure
        .alpha_carbons()
        .iter()
        .map(|a| a.temp_factor)
        .collect()
}

/// Mean B-factor of one residue.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResidueBFactor {
    pub chain: char,
    pub res_seq: i32,
    pub i_code: Option<char>,
    pub res_name: String,
    /// Number of atoms averaged.
    pub atoms: usize,
    pub mean: f64,
}

/// Per-residue mean B-factor of side-chain heavy atoms, in file order.
///
/// Glycine has no side chain, so its backbone heavy atoms are averaged
/// instead. `filter` restricts which records are read (chains, HETATM,
/// alternate locations); its atom-name filter is replaced by the side-chain
/// rule and hydrogens are always skipped. Residues with no qualifying atom,
/// e.g. a side chain that was not modelled, are left out.
pub fn residue_bfactors(structure: &Structure, filter: &Selection) -> Vec<ResidueBFactor> {
    let side_chain = Selection {
        atoms: AtomFilter::Exclude(BACKBONE_ATOMS.iter().map(|n| n.to_string()).collect()),
        exclude_hydrogens: true,
        ..filter.clone()
    };
    let glycine = Selection {
        atoms: AtomFilter::All,
        exclude_hydrogens: true,
        ..filter.clone()
    };

    let mut out = Vec::new();
    let mut current: Option<(ResidueBFactor, f64)> = None;
    for atom in &structure.atoms {
        let same = current.as_ref().is_some_and(|(r, _)| {
            r.chain == atom.chain_id && r.res_seq == atom.res_seq && r.i_code == atom.i_code
        });
        if !same {
            flush_residue(&mut out, current.take());
            current = Some((
                ResidueBFactor {
                    chain: atom.chain_id,
                    res_seq: atom.res_seq,
                    i_code: atom.i_code,
                    res_name: atom.res_name.clone(),
                    atoms: 0,
                    mean: 0.0,
                },
                0.0,
            ));
        }
        let rule = if atom.res_name == "GLY" { &glycine } else { &side_chain };
        if let Some((residue, sum)) = current.as_mut() {
            if rule.matches(atom) {
                residue.atoms += 1;
                *sum += atom.temp_factor;
            }
        }
    }
    flush_residue(&mut out, current);
    out
}

fn flush_residue(out: &mut Vec<ResidueBFactor>, residue: Option<(ResidueBFactor, f64)>) {
    if let Some((mut residue, sum)) = residue {
        if residue.atoms > 0 {
            residue.mean = sum / residue.atoms as f64;
            out.push(residue);
        }
    }
}

/// Acceptance thresholds for predicted models.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfidenceThresholds {
    /// Mean pLDDT must exceed this.
    pub min_mean: f64,
    /// Median pLDDT must exceed this.
    pub min_median: f64,
    /// Mean of the lowest values must exceed this.
    pub min_low_mean: f64,
    /// Backbone RMSD (Angstroms) must stay below this.
    pub max_rmsd: f64,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            min_mean: 80.0,
            min_median: 80.0,
            min_low_mean: 45.0,
            max_rmsd: 3.0,
        }
    }
}

/// Confidence summary of one predicted model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfidenceReport {
    pub model: String,
    pub stats: PlddtStats,
    /// Backbone RMSD against the reference; 0 without one.
    pub backbone_rmsd: f64,
}

impl ConfidenceReport {
    /// Whether every threshold is met.
    pub fn passes(&self, t: &ConfidenceThresholds) -> bool {
        self.stats.mean > t.min_mean
            && self.stats.median > t.min_median
            && self.stats.low_mean > t.min_low_mean
            && self.backbone_rmsd < t.max_rmsd
    }
}

/// Summarise `model`, comparing its backbone with `reference` when given.
///
/// # Errors
///
/// - [`StrucdevError::InvalidInput`] when the model has no CA atoms.
/// - Backbone extraction or superposition errors against the reference.
pub fn assess_model(
    model: &Structure,
    label: impl Into<String>,
    reference: Option<&Structure>,
) -> Result<ConfidenceReport> {
    let label = label.into();
    let stats = PlddtStats::from_values(&plddt_values(model)).ok_or_else(|| {
        StrucdevError::InvalidInput(format!("{}: no CA atoms to read pLDDT from", label))
    })?;

    let backbone_rmsd = match reference {
        Some(reference) => {
            let selection = Selection::backbone();
            let mobile = select_points(model, &selection, label.clone())?;
            let target = select_points(reference, &selection, reference.id.clone())?;
            superposed_rmsd(&mobile, &target)?
        }
        None => 0.0,
    };

    Ok(ConfidenceReport {
        model: label,
        stats,
        backbone_rmsd,
    })
}
