//! Core types: points, atom records, structures and labelled point sets.

use strucdev_core::{Annotated, Summarizable};

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

/// A point in 3D Cartesian space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    /// Create a new point.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The origin.
    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point3D) -> f64 {
        self.sub(other).norm()
    }

    /// Dot product.
    pub fn dot(&self, other: &Point3D) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product.
    pub fn cross(&self, other: &Point3D) -> Point3D {
        Point3D {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Vector magnitude.
    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or zero if magnitude is zero.
    pub fn normalize(&self) -> Point3D {
        let n = self.norm();
        if n < 1e-15 {
            Point3D::zero()
        } else {
            self.scale(1.0 / n)
        }
    }

    /// Vector addition.
    pub fn add(&self, other: &Point3D) -> Point3D {
        Point3D {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }

    /// Vector subtraction.
    pub fn sub(&self, other: &Point3D) -> Point3D {
        Point3D {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }

    /// Scalar multiplication.
    pub fn scale(&self, s: f64) -> Point3D {
        Point3D {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }
}

/// Record type of an atomic coordinate line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecordKind {
    /// `ATOM`: standard polymer residue.
    Atom,
    /// `HETATM`: ligand, solvent or modified residue.
    Hetatm,
}

/// A single atomic coordinate record, flattened with its residue context.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Atom {
    pub record: RecordKind,
    /// Atom serial number.
    pub serial: u32,
    /// Atom name, trimmed (e.g. "CA", "N", "CB").
    pub name: String,
    /// Alternate location indicator.
    pub alt_loc: Option<char>,
    /// Three-letter residue name.
    pub res_name: String,
    /// Chain identifier (blank chains are stored as `' '`).
    pub chain_id: char,
    /// Residue sequence number.
    pub res_seq: i32,
    /// Insertion code.
    pub i_code: Option<char>,
    /// 3D coordinates in Angstroms.
    pub coords: Point3D,
    pub occupancy: f64,
    /// Temperature factor (B-factor). Predicted models store pLDDT here.
    pub temp_factor: f64,
    /// Element symbol from columns 77-78.
    pub element: Option<String>,
}

impl Atom {
    /// Whether this atom is a backbone atom (N, CA, C, O).
    pub fn is_backbone(&self) -> bool {
        matches!(self.name.as_str(), "N" | "CA" | "C" | "O")
    }

    /// Whether this is an alpha carbon.
    pub fn is_alpha_carbon(&self) -> bool {
        self.name == "CA"
    }

    /// Whether this is a hydrogen (or deuterium).
    ///
    /// Uses the element column when present, otherwise the first alphabetic
    /// character of the atom name ("1HB" -> H).
    pub fn is_hydrogen(&self) -> bool {
        match self.element.as_deref() {
            Some(e) => e.eq_ignore_ascii_case("H") || e.eq_ignore_ascii_case("D"),
            None => matches!(
                self.name.chars().find(|c| c.is_ascii_alphabetic()),
                Some('H') | Some('D')
            ),
        }
    }
}

/// A parsed structure: one model's atom records in file order.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Structure {
    /// PDB identifier or user-supplied name.
    pub id: String,
    pub atoms: Vec<Atom>,
}

impl Structure {
    /// Total number of atom records.
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Number of distinct consecutive residues (chain, number, insertion code).
    pub fn residue_count(&self) -> usize {
        let mut count = 0;
        let mut last: Option<(char, i32, Option<char>)> = None;
        for atom in &self.atoms {
            let key = (atom.chain_id, atom.res_seq, atom.i_code);
            if last != Some(key) {
                count += 1;
                last = Some(key);
            }
        }
        count
    }

    /// Distinct chain identifiers in order of first appearance.
    pub fn chain_ids(&self) -> Vec<char> {
        let mut ids: Vec<char> = Vec::new();
        for atom in &self.atoms {
            if !ids.contains(&atom.chain_id) {
                ids.push(atom.chain_id);
            }
        }
        ids
    }

    /// Collect all alpha carbon atoms in file order.
    pub fn alpha_carbons(&self) -> Vec<&Atom> {
        self.atoms.iter().filter(|a| a.is_alpha_carbon()).collect()
    }
}

impl Annotated for Structure {
    fn name(&self) -> &str {
        &self.id
    }
}

impl Summarizable for Structure {
    fn summary(&self) -> String {
        format!(
            "Structure {}: {} chain(s), {} residue(s), {} atom(s)",
            self.id,
            self.chain_ids().len(),
            self.residue_count(),
            self.atom_count(),
        )
    }
}

/// An ordered, labelled list of coordinates; one point per selected atom.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointSet {
    /// Identifier used in reports (usually the file name).
    pub label: String,
    pub points: Vec<Point3D>,
}

impl PointSet {
    pub fn new(label: impl Into<String>, points: Vec<Point3D>) -> Self {
        Self {
            label: label.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Annotated for PointSet {
    fn name(&self) -> &str {
        &self.label
    }
}

impl Summarizable for PointSet {
    fn summary(&self) -> String {
        format!("{}: {} point(s)", self.label, self.points.len())
    }
}
