//! Ensemble deviation and diversity.
//!
//! Deviation is the RMSD of every member against a reference; diversity is
//! the RMSD of every unordered member pair `(i, j)` with `i < j`, in member
//! order. Both come with their arithmetic mean, which is 0 for an empty list.

use strucdev_core::{Result, Summarizable};

use crate::superposition::{in_place_rmsd, superposed_rmsd};
use crate::types::PointSet;

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// How two point sets are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RmsdMode {
    /// Optimal rigid superposition (Kabsch) before measuring.
    #[default]
    Superposed,
    /// Direct comparison for structures that already share a frame.
    InPlace,
}

impl RmsdMode {
    /// RMSD between `mobile` and `target` under this mode.
    pub fn rmsd(self, mobile: &PointSet, target: &PointSet) -> Result<f64> {
        match self {
            RmsdMode::Superposed => superposed_rmsd(mobile, target),
            RmsdMode::InPlace => in_place_rmsd(mobile, target),
        }
    }
}

/// RMSD of one member against the reference.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemberDeviation {
    pub member: String,
    pub rmsd: f64,
}

/// RMSD of one unordered member pair.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairDiversity {
    pub first: String,
    pub second: String,
    pub rmsd: f64,
}

/// A member left out of the comparison, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemberRejection {
    pub member: String,
    pub reason: String,
}

/// Deviation and diversity of an ensemble.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnsembleReport {
    pub reference: Option<String>,
    /// Labels of the compared members, in order.
    pub members: Vec<String>,
    pub deviation: Vec<MemberDeviation>,
    pub diversity: Vec<PairDiversity>,
    pub mean_deviation: f64,
    pub mean_diversity: f64,
    /// Members left out of both lists.
    pub rejected: Vec<MemberRejection>,
}

impl Summarizable for EnsembleReport {
    fn summary(&self) -> String {
        format!(
            "Ensemble: {} member(s) vs {}, mean deviation {:.3}, {} pair(s), mean diversity {:.3}, {} rejected",
            self.members.len(),
            self.reference.as_deref().unwrap_or("no reference"),
            self.mean_deviation,
            self.diversity.len(),
            self.mean_diversity,
            self.rejected.len(),
        )
    }
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// RMSD of every member against `reference`, in member order.
///
/// # Errors
///
/// Fails on the first member whose comparison fails (size mismatch or
/// degenerate geometry); the error names that member.
pub fn deviation(
    reference: &PointSet,
    members: &[PointSet],
    mode: RmsdMode,
) -> Result<Vec<MemberDeviation>> {
    members
        .iter()
        .map(|m| {
            Ok(MemberDeviation {
                member: m.label.clone(),
                rmsd: mode.rmsd(m, reference).map_err(|e| e.in_item(m.label.as_str()))?,
            })
        })
        .collect()
}

/// RMSD of every unordered pair `(i, j)`, `i < j`, in member order.
///
/// Fewer than two members yield an empty list. A failing pair is reported
/// as `"<first> vs <second>"`.
pub fn diversity(members: &[PointSet], mode: RmsdMode) -> Result<Vec<PairDiversity>> {
    let pairs = pair_indices(members.len());
    let compare = |&(i, j): &(usize, usize)| -> Result<PairDiversity> {
        let (a, b) = (&members[i], &members[j]);
        let rmsd = mode
            .rmsd(a, b)
            .map_err(|e| e.in_item(format!("{} vs {}", a.label, b.label)))?;
        Ok(PairDiversity {
            first: a.label.clone(),
            second: b.label.clone(),
            rmsd,
        })
    };

    #[cfg(feature = "parallel")]
    let out = pairs.par_iter().map(compare).collect();
    #[cfg(not(feature = "parallel"))]
    let out = pairs.iter().map(compare).collect();
    out
}

fn pair_indices(n: usize) -> Vec<(usize, usize)> {
    let mut pairs = Vec::with_capacity(n.saturating_sub(1) * n / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            pairs.push((i, j));
        }
    }
    pairs
}

/// Split `members` into those with the expected point count and the rest.
///
/// The expected count is the reference's, or the first member's when there
/// is no reference.
pub fn screen_shapes(
    reference: Option<&PointSet>,
    members: Vec<PointSet>,
) -> (Vec<PointSet>, Vec<MemberRejection>) {
    let expected = match reference.or(members.first()).map(PointSet::len) {
        Some(n) => n,
        None => return (members, Vec::new()),
    };
    let mut kept = Vec::with_capacity(members.len());
    let mut rejected = Vec::new();
    for set in members {
        if set.len() == expected {
            kept.push(set);
        } else {
            rejected.push(MemberRejection {
                reason: format!("{} point(s), expected {}", set.len(), expected),
                member: set.label,
            });
        }
    }
    (kept, rejected)
}

/// Members that survived the reference comparison, their deviations, and
/// the members whose comparison failed.
struct Screened {
    kept: Vec<PointSet>,
    deviation: Vec<MemberDeviation>,
    rejected: Vec<MemberRejection>,
}

/// Compare every member with the reference (or, without one, with itself)
/// and set aside those the comparison fails on.
fn screen_geometry(
    reference: Option<&PointSet>,
    members: Vec<PointSet>,
    mode: RmsdMode,
) -> Screened {
    let mut out = Screened {
        kept: Vec::with_capacity(members.len()),
        deviation: Vec::new(),
        rejected: Vec::new(),
    };
    for member in members {
        match mode.rmsd(&member, reference.unwrap_or(&member)) {
            Ok(rmsd) => {
                if reference.is_some() {
                    out.deviation.push(MemberDeviation {
                        member: member.label.clone(),
                        rmsd,
                    });
                }
                out.kept.push(member);
            }
            Err(e) => out.rejected.push(MemberRejection {
                member: member.label,
                reason: e.to_string(),
            }),
        }
    }
    out
}

/// Screen the members, then compute deviation (when a reference is given)
/// and diversity.
///
/// Members of the wrong size, or whose comparison with the reference fails,
/// are moved to [`EnsembleReport::rejected`] and left out of both lists.
///
/// # Errors
///
/// Fails when the reference itself cannot be compared (e.g. collapsed or
/// collinear under superposition), or when a pair of surviving members
/// cannot be; both errors name the item.
pub fn analyze_ensemble(
    reference: Option<&PointSet>,
    members: Vec<PointSet>,
    mode: RmsdMode,
) -> Result<EnsembleReport> {
    if let Some(r) = reference {
        mode.rmsd(r, r).map_err(|e| e.in_item(r.label.as_str()))?;
    }
    let (members, mut rejected) = screen_shapes(reference, members);
    let screened = screen_geometry(reference, members, mode);
    rejected.extend(screened.rejected);
    let members = screened.kept;
    let deviation = screened.deviation;

    let diversity = diversity(&members, mode)?;

    let dev_values: Vec<f64> = deviation.iter().map(|d| d.rmsd).collect();
    let div_values: Vec<f64> = diversity.iter().map(|d| d.rmsd).collect();

    Ok(EnsembleReport {
        reference: reference.map(|r| r.label.clone()),
        members: members.iter().map(|m| m.label.clone()).collect(),
        mean_deviation: mean(&dev_values),
        mean_diversity: mean(&div_values),
        deviation,
        diversity,
        rejected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point3D;
    use alloc::vec;

    fn tetra(label: &str, shift: f64) -> PointSet {
        PointSet::new(
            label,
            vec![
                Point3D::new(0.0, 0.0, 0.0),
                Point3D::new(1.5, 0.0, 0.0),
                Point3D::new(0.0, 1.5, 0.0),
                Point3D::new(0.0, 0.0, 1.5 + shift),
            ],
        )
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert!((mean(&[1.0, 2.0, 3.0]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn diversity_of_single_member_is_empty() {
        let d = diversity(&[tetra("a", 0.0)], RmsdMode::Superposed).unwrap();
        assert!(d.is_empty());
        assert!(diversity(&[], RmsdMode::Superposed).unwrap().is_empty());
    }

    #[test]
    fn pairs_follow_member_order() {
        let members = vec![tetra("a", 0.0), tetra("b", 0.2), tetra("c", 0.4)];
        let d = diversity(&members, RmsdMode::Superposed).unwrap();
        let labels: Vec<(&str, &str)> = d
            .iter()
            .map(|p| (p.first.as_str(), p.second.as_str()))
            .collect();
        assert_eq!(labels, vec![("a", "b"), ("a", "c"), ("b", "c")]);
        assert!(d[1].rmsd > d[0].rmsd);
    }

    #[test]
    fn identical_members_have_zero_deviation() {
        let reference = tetra("ref", 0.0);
        let members = vec![tetra("m1", 0.0), tetra("m2", 0.0)];
        let report = analyze_ensemble(Some(&reference), members, RmsdMode::Superposed).unwrap();
        assert_eq!(report.deviation.len(), 2);
        assert!(report.mean_deviation.abs() < 1e-9);
        assert_eq!(report.diversity.len(), 1);
        assert!(report.mean_diversity.abs() < 1e-9);
        assert_eq!(report.reference.as_deref(), Some("ref"));
    }

    #[test]
    fn no_reference_means_empty_deviation() {
        let members = vec![tetra("a", 0.0), tetra("b", 0.3)];
        let report = analyze_ensemble(None, members, RmsdMode::Superposed).unwrap();
        assert!(report.deviation.is_empty());
        assert_eq!(report.mean_deviation, 0.0);
        assert_eq!(report.diversity.len(), 1);
    }

    #[test]
    fn mismatched_members_are_set_aside() {
        let reference = tetra("ref", 0.0);
        let mut short = tetra("short", 0.0);
        short.points.pop();
        let members = vec![tetra("ok", 0.1), short];
        let report = analyze_ensemble(Some(&reference), members, RmsdMode::Superposed).unwrap();
        assert_eq!(report.deviation.len(), 1);
        assert_eq!(
            report.rejected,
            vec![MemberRejection {
                member: "short".into(),
                reason: "3 point(s), expected 4".into(),
            }]
        );
    }

    fn collapsed(label: &str) -> PointSet {
        PointSet::new(label, vec![Point3D::new(2.0, 2.0, 2.0); 4])
    }

    #[test]
    fn collapsed_member_is_skipped_not_fatal() {
        let reference = tetra("ref", 0.0);
        let members = vec![tetra("m1", 0.0), collapsed("m2"), tetra("m3", 0.2)];
        let report = analyze_ensemble(Some(&reference), members, RmsdMode::Superposed).unwrap();
        assert_eq!(report.members, vec!["m1", "m3"]);
        assert_eq!(report.deviation.len(), 2);
        assert_eq!(report.diversity.len(), 1);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].member, "m2");
        assert!(report.rejected[0].reason.contains("degenerate"));
    }

    #[test]
    fn collapsed_member_is_skipped_without_reference() {
        let members = vec![collapsed("m1"), tetra("m2", 0.0), tetra("m3", 0.2)];
        let report = analyze_ensemble(None, members, RmsdMode::Superposed).unwrap();
        assert_eq!(report.members, vec!["m2", "m3"]);
        assert_eq!(report.rejected[0].member, "m1");
    }

    #[test]
    fn collapsed_reference_names_itself() {
        let reference = collapsed("xtal");
        let err = analyze_ensemble(Some(&reference), vec![tetra("m1", 0.0)], RmsdMode::Superposed)
            .unwrap_err();
        assert!(err.to_string().starts_with("xtal: "));
    }

    #[test]
    fn strict_functions_name_the_failing_item() {
        let err =
            deviation(&tetra("ref", 0.0), &[collapsed("m2")], RmsdMode::Superposed).unwrap_err();
        assert!(err.to_string().starts_with("m2: "));
        let members = [tetra("m1", 0.0), collapsed("m2")];
        let err = diversity(&members, RmsdMode::Superposed).unwrap_err();
        assert!(err.to_string().starts_with("m1 vs m2: "));
    }

    #[test]
    fn strict_deviation_fails_on_mismatch() {
        let mut short = tetra("short", 0.0);
        short.points.pop();
        assert!(deviation(&tetra("ref", 0.0), &[short], RmsdMode::InPlace).is_err());
    }

    #[test]
    fn in_place_mode_sees_translation() {
        let a = tetra("a", 0.0);
        let mut b = tetra("b", 0.0);
        for p in &mut b.points {
            p.x += 2.0;
        }
        let superposed = RmsdMode::Superposed.rmsd(&a, &b).unwrap();
        let in_place = RmsdMode::InPlace.rmsd(&a, &b).unwrap();
        assert!(superposed < 1e-9);
        assert!((in_place - 2.0).abs() < 1e-9);
    }

    #[test]
    fn summary_mentions_reference() {
        let reference = tetra("ref", 0.0);
        let members = vec![tetra("m1", 0.0), tetra("m2", 0.1), tetra("m3", 0.2)];
        let report = analyze_ensemble(Some(&reference), members, RmsdMode::Superposed).unwrap();
        let s = report.summary();
        assert!(s.contains("3 member(s) vs ref"));
        assert!(s.contains("3 pair(s)"));
    }
}
