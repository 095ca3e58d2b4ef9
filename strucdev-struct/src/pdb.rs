//! PDB coordinate extraction.
//!
//! Parses ATOM, HETATM, HEADER and MODEL/ENDMDL records from fixed-column PDB
//! text. Only the first MODEL is returned for multi-model (NMR, ensemble
//! refinement) files; use [`crate::models`] to get at every member.

use strucdev_core::{Result, StrucdevError};

use crate::selection::Selection;
use crate::types::{Atom, Point3D, PointSet, RecordKind, Structure};

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// Parse a PDB-format string into a [`Structure`].
///
/// # Errors
///
/// Returns an error if no ATOM/HETATM records are found or if a coordinate
/// record is malformed (too short, unparseable serial or coordinates).
pub fn parse_pdb(input: &str) -> Result<Structure> {
    let mut id = String::from("UNKN");
    let mut atoms: Vec<Atom> = Vec::new();
    let mut seen_model = false;

    for line in input.lines() {
        if line.starts_with("ENDMDL") {
            break; // only first model
        }
        if line.starts_with("MODEL") {
            if seen_model {
                break;
            }
            seen_model = true;
            continue;
        }

        if line.starts_with("HEADER") && line.len() >= 66 {
            let pdb_id = safe_slice(line, 62, 66).trim();
            if !pdb_id.is_empty() {
                id = pdb_id.into();
            }
        }

        if let Some(record) = record_kind(line) {
            atoms.push(parse_atom_record(line, record)?);
        }
    }

    if atoms.is_empty() {
        return Err(StrucdevError::Parse("no ATOM records found".into()));
    }

    Ok(Structure { id, atoms })
}

/// Points of every atom in `structure` accepted by `selection`, in file order.
///
/// # Errors
///
/// Returns [`StrucdevError::InvalidInput`] when no atom qualifies.
pub fn select_points(
    structure: &Structure,
    selection: &Selection,
    label: impl Into<String>,
) -> Result<PointSet> {
    let label = label.into();
    let points: Vec<Point3D> = structure
        .atoms
        .iter()
        .filter(|a| selection.matches(a))
        .map(|a| a.coords)
        .collect();
    if points.is_empty() {
        return Err(StrucdevError::InvalidInput(format!(
            "{}: no atoms match the {} selection",
            label,
            selection.describe().to_lowercase()
        )));
    }
    Ok(PointSet::new(label, points))
}

/// Parse `input` and extract the selected coordinates in one step.
pub fn extract_points(
    input: &str,
    selection: &Selection,
    label: impl Into<String>,
) -> Result<PointSet> {
    let structure = parse_pdb(input)?;
    select_points(&structure, selection, label)
}

/// Read a file into a string, attaching the path to any I/O error.
#[cfg(feature = "std")]
pub(crate) fn read_text(path: &::std::path::Path) -> Result<String> {
    ::std::fs::read_to_string(path).map_err(|e| {
        StrucdevError::Io(::std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })
}

/// File name of `path`, used as the member label in reports.
#[cfg(feature = "std")]
pub fn file_label(path: &::std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse a PDB file from disk.
#[cfg(feature = "std")]
pub fn parse_pdb_file(path: impl AsRef<::std::path::Path>) -> Result<Structure> {
    let contents = read_text(path.as_ref())?;
    parse_pdb(&contents)
}

/// Extract the selected coordinates of a PDB file, labelled with its file name.
#[cfg(feature = "std")]
pub fn extract_points_file(
    path: impl AsRef<::std::path::Path>,
    selection: &Selection,
) -> Result<PointSet> {
    let path = path.as_ref();
    let contents = read_text(path)?;
    extract_points(&contents, selection, file_label(path))
}

/// A structure file together with the selection applied to it.
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct StructureRecord {
    pub path: ::std::path::PathBuf,
    pub selection: Selection,
}

#[cfg(feature = "std")]
impl StructureRecord {
    pub fn new(path: impl Into<::std::path::PathBuf>, selection: Selection) -> Self {
        Self {
            path: path.into(),
            selection,
        }
    }

    /// Read the file and derive a fresh point set.
    pub fn load(&self) -> Result<PointSet> {
        extract_points_file(&self.path, &self.selection)
    }
}

pub(crate) fn record_kind(line: &str) -> Option<RecordKind> {
    if line.starts_with("ATOM  ") {
        Some(RecordKind::Atom)
    } else if line.starts_with("HETATM") {
        Some(RecordKind::Hetatm)
    } else {
        None
    }
}

pub(crate) fn parse_atom_record(line: &str, record: RecordKind) -> Result<Atom> {
    // PDB format is fixed-width columns. We need at least 54 chars for coords.
    if line.len() < 54 {
        return Err(StrucdevError::Parse(format!(
            "ATOM record too short ({} chars): {}",
            line.len(),
            line
        )));
    }

    let serial = safe_slice(line, 6, 11)
        .trim()
        .parse::<u32>()
        .map_err(|e| StrucdevError::Parse(format!("bad atom serial: {}", e)))?;

    let name = safe_slice(line, 12, 16).trim().to_string();
    let alt_loc = optional_char(line, 16);
    let res_name = safe_slice(line, 17, 20).trim().to_string();
    let chain_id = safe_slice(line, 21, 22).chars().next().unwrap_or(' ');

    let res_seq = safe_slice(line, 22, 26)
        .trim()
        .parse::<i32>()
        .map_err(|e| StrucdevError::Parse(format!("bad residue seq number: {}", e)))?;
    let i_code = optional_char(line, 26);

    let x = parse_coord(line, 30, 38, "x")?;
    let y = parse_coord(line, 38, 46, "y")?;
    let z = parse_coord(line, 46, 54, "z")?;

    let occupancy = safe_slice(line, 54, 60).trim().parse::<f64>().unwrap_or(1.0);
    let temp_factor = safe_slice(line, 60, 66).trim().parse::<f64>().unwrap_or(0.0);

    let element = {
        let e = safe_slice(line, 76, 78).trim();
        if e.is_empty() {
            None
        } else {
            Some(e.to_string())
        }
    };

    Ok(Atom {
        record,
        serial,
        name,
        alt_loc,
        res_name,
        chain_id,
        res_seq,
        i_code,
        coords: Point3D::new(x, y, z),
        occupancy,
        temp_factor,
        element,
    })
}

fn parse_coord(line: &str, start: usize, end: usize, axis: &str) -> Result<f64> {
    safe_slice(line, start, end)
        .trim()
        .parse::<f64>()
        .map_err(|e| StrucdevError::Parse(format!("bad {} coordinate: {}", axis, e)))
}

fn optional_char(line: &str, col: usize) -> Option<char> {
    match safe_slice(line, col, col + 1).chars().next() {
        None | Some(' ') => None,
        Some(c) => Some(c),
    }
}

/// Safe substring that handles short lines gracefully.
pub(crate) fn safe_slice(s: &str, start: usize, end: usize) -> &str {
    let len = s.len();
    if start >= len {
        return "";
    }
    let actual_end = end.min(len);
    s.get(start..actual_end).unwrap_or("")
}
