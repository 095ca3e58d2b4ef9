//! Atom selection predicates.
//!
//! A [`Selection`] decides which atomic records of a structure contribute a
//! point to a [`PointSet`](crate::types::PointSet). Selections are plain
//! values: build one from a preset and refine it with the builder methods.

use crate::types::{Atom, RecordKind};

use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// Backbone atom names, in the order they appear in a residue.
pub const BACKBONE_ATOMS: [&str; 4] = ["N", "CA", "C", "O"];

/// Filter on (trimmed) atom names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AtomFilter {
    /// Every atom name qualifies.
    #[default]
    All,
    /// Only the listed names qualify.
    Include(Vec<String>),
    /// Every name except the listed ones qualifies.
    Exclude(Vec<String>),
}

impl AtomFilter {
    fn accepts(&self, name: &str) -> bool {
        match self {
            AtomFilter::All => true,
            AtomFilter::Include(names) => names.iter().any(|n| n == name),
            AtomFilter::Exclude(names) => !names.iter().any(|n| n == name),
        }
    }
}

/// How alternate locations are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AltLocPolicy {
    /// Keep every record regardless of its alternate location.
    #[default]
    All,
    /// Keep records with a blank or `A` location only.
    Primary,
}

/// Which atomic records become points.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Selection {
    pub atoms: AtomFilter,
    /// Also accept `HETATM` records. Off by default: ligands and waters
    /// rarely match one-to-one between structures.
    pub include_hetatm: bool,
    pub exclude_hydrogens: bool,
    /// Restrict to these chains; `None` accepts every chain.
    pub chains: Option<Vec<char>>,
    pub alt_locs: AltLocPolicy,
}

impl Default for Selection {
    fn default() -> Self {
        Self::all_atoms()
    }
}

impl Selection {
    /// Every `ATOM` record.
    pub fn all_atoms() -> Self {
        Self {
            atoms: AtomFilter::All,
            include_hetatm: false,
            exclude_hydrogens: false,
            chains: None,
            alt_locs: AltLocPolicy::All,
        }
    }

    /// N, CA, C and O of every residue.
    pub fn backbone() -> Self {
        Self {
            atoms: AtomFilter::Include(names(&BACKBONE_ATOMS)),
            ..Self::all_atoms()
        }
    }

    /// Every atom except the backbone.
    pub fn side_chain() -> Self {
        Self {
            atoms: AtomFilter::Exclude(names(&BACKBONE_ATOMS)),
            ..Self::all_atoms()
        }
    }

    /// Alpha carbons only.
    pub fn alpha_carbons() -> Self {
        Self {
            atoms: AtomFilter::Include(names(&["CA"])),
            ..Self::all_atoms()
        }
    }

    pub fn with_chains(mut self, chains: Vec<char>) -> Self {
        self.chains = if chains.is_empty() { None } else { Some(chains) };
        self
    }

    pub fn with_hetatm(mut self, include: bool) -> Self {
        self.include_hetatm = include;
        self
    }

    pub fn without_hydrogens(mut self) -> Self {
        self.exclude_hydrogens = true;
        self
    }

    pub fn with_alt_locs(mut self, policy: AltLocPolicy) -> Self {
        self.alt_locs = policy;
        self
    }

    /// Whether `atom` qualifies under this selection.
    pub fn matches(&self, atom: &Atom) -> bool {
        if atom.record == RecordKind::Hetatm && !self.include_hetatm {
            return false;
        }
        if let Some(chains) = &self.chains {
            if !chains.contains(&atom.chain_id) {
                return false;
            }
        }
        if self.alt_locs == AltLocPolicy::Primary && !matches!(atom.alt_loc, None | Some('A')) {
            return false;
        }
        if self.exclude_hydrogens && atom.is_hydrogen() {
            return false;
        }
        self.atoms.accepts(&atom.name)
    }

    /// Short human-readable description, used in log lines and report headers.
    pub fn describe(&self) -> &'static str {
        match &self.atoms {
            AtomFilter::All => "All-atom",
            AtomFilter::Include(n) if is_backbone_list(n) => "Backbone",
            AtomFilter::Exclude(n) if is_backbone_list(n) => "Side-chain",
            AtomFilter::Include(_) => "Selected-atom",
            AtomFilter::Exclude(_) => "Filtered-atom",
        }
    }
}

fn is_backbone_list(list: &[String]) -> bool {
    list.len() == BACKBONE_ATOMS.len()
        && list.iter().all(|n| BACKBONE_ATOMS.contains(&n.as_str()))
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
