//! Aromatic ring stacking geometry.
//!
//! Rings are given as atom groups. Each group resolves to coordinates in a
//! structure, from which a centroid and a least-squares plane are derived.
//! Every unordered pair of groups then yields a centroid distance and an
//! interplanar angle.
//!
//! Atom groups are written in one of two text forms:
//!
//! ```text
//! [['A48CG','A48CD2','A48CE2'],['A301C5','A301C4','A301C3A']]
//! PHE48=A48CG,A48CD2,A48CE2;LIG=A301C5,A301C4,A301C3A
//! ```
//!
//! An atom specifier is `<chain><resSeq><name>` (`A48CG`, `B-3CA`, or `12CB`
//! for a blank chain) or the explicit `<chain>:<resSeq>:<name>`, which is
//! required when the atom name itself starts with a digit.

use core::fmt;
use core::iter::Peekable;
use core::str::{Chars, FromStr};

use strucdev_core::{Result, StrucdevError};

use crate::geometry::{fit_plane, interplanar_angle, Plane};
use crate::types::{Point3D, Structure};

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// One atom addressed by chain, residue number and atom name.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AtomSpec {
    /// `None` addresses a blank chain identifier.
    pub chain: Option<char>,
    pub res_seq: i32,
    pub name: String,
}

impl AtomSpec {
    fn matches(&self, chain_id: char, res_seq: i32, name: &str) -> bool {
        let chain = self.chain.unwrap_or(' ');
        chain == chain_id && self.res_seq == res_seq && self.name == name
    }
}

impl fmt::Display for AtomSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(c) = self.chain {
            write!(f, "{}", c)?;
        }
        write!(f, "{}{}", self.res_seq, self.name)
    }
}

impl FromStr for AtomSpec {
    type Err = StrucdevError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let bad = |why: &str| StrucdevError::Parse(format!("bad atom specifier '{}': {}", s, why));

        if s.contains(':') {
            let parts: Vec<&str> = s.split(':').map(str::trim).collect();
            if parts.len() != 3 {
                return Err(bad("expected <chain>:<resSeq>:<name>"));
            }
            let mut chain_chars = parts[0].chars();
            let chain = match (chain_chars.next(), chain_chars.next()) {
                (None, _) => None,
                (Some(c), None) => Some(c),
                _ => return Err(bad("chain must be a single character")),
            };
            let res_seq = parts[1]
                .parse::<i32>()
                .map_err(|_| bad("residue number is not an integer"))?;
            if parts[2].is_empty() {
                return Err(bad("missing atom name"));
            }
            return Ok(AtomSpec {
                chain,
                res_seq,
                name: parts[2].to_string(),
            });
        }

        let mut rest = s;
        let mut chain = None;
        if let Some(first) = rest.chars().next() {
            if first.is_ascii_alphabetic() {
                chain = Some(first);
                rest = &rest[first.len_utf8()..];
            }
        }
        let digits_start = usize::from(rest.starts_with('-'));
        let digits_len = rest[digits_start..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        if digits_len == 0 {
            return Err(bad("missing residue number"));
        }
        let (num, name) = rest.split_at(digits_start + digits_len);
        let res_seq = num
            .parse::<i32>()
            .map_err(|_| bad("residue number out of range"))?;
        if name.is_empty() {
            return Err(bad("missing atom name"));
        }
        Ok(AtomSpec {
            chain,
            res_seq,
            name: name.to_string(),
        })
    }
}

/// A named, ordered list of atoms, typically one aromatic ring.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AtomGroup {
    pub label: String,
    pub atoms: Vec<AtomSpec>,
}

/// Parse atom groups from either text form.
///
/// Groups from the bracketed form are labelled `group1`, `group2`, ...
///
/// # Errors
///
/// Returns [`StrucdevError::Parse`] on malformed text, an empty group, or no
/// group at all.
pub fn parse_atom_groups(text: &str) -> Result<Vec<AtomGroup>> {
    let trimmed = text.trim();
    let groups = if trimmed.starts_with('[') {
        parse_bracketed(trimmed)?
    } else {
        parse_named(trimmed)?
    };
    if groups.is_empty() {
        return Err(StrucdevError::Parse("no atom groups given".into()));
    }
    Ok(groups)
}

fn parse_named(text: &str) -> Result<Vec<AtomGroup>> {
    let mut groups = Vec::new();
    for segment in text.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let (label, list) = segment.split_once('=').ok_or_else(|| {
            StrucdevError::Parse(format!("group '{}' is missing '=': expected LABEL=ATOM,...", segment))
        })?;
        let label = label.trim();
        if label.is_empty() {
            return Err(StrucdevError::Parse(format!("group '{}' has an empty label", segment)));
        }
        let atoms = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(AtomSpec::from_str)
            .collect::<Result<Vec<_>>>()?;
        groups.push(checked_group(label.to_string(), atoms)?);
    }
    Ok(groups)
}

fn parse_bracketed(text: &str) -> Result<Vec<AtomGroup>> {
    let mut chars = text.chars().peekable();
    expect(&mut chars, '[')?;
    let mut groups = Vec::new();
    loop {
        match next_significant(&mut chars) {
            Some(']') => break,
            Some('[') => {
                let atoms = parse_string_list(&mut chars)?;
                groups.push(checked_group(format!("group{}", groups.len() + 1), atoms)?);
                match next_significant(&mut chars) {
                    Some(',') => continue,
                    Some(']') => break,
                    other => return Err(unexpected(other, "',' or ']'")),
                }
            }
            other => return Err(unexpected(other, "'[' or ']'")),
        }
    }
    if let Some(c) = next_significant(&mut chars) {
        return Err(StrucdevError::Parse(format!("trailing '{}' after atom groups", c)));
    }
    Ok(groups)
}

/// Parse `'a', "b", ...]` after an opening bracket has been consumed.
fn parse_string_list(chars: &mut Peekable<Chars<'_>>) -> Result<Vec<AtomSpec>> {
    let mut atoms = Vec::new();
    loop {
        match next_significant(chars) {
            Some(']') if atoms.is_empty() => return Ok(atoms),
            Some(q @ ('\'' | '"')) => {
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some(c) if c == q => break,
                        Some(c) => value.push(c),
                        None => {
                            return Err(StrucdevError::Parse(
                                "unterminated quoted atom specifier".into(),
                            ))
                        }
                    }
                }
                atoms.push(value.parse()?);
                match next_significant(chars) {
                    Some(',') => continue,
                    Some(']') => return Ok(atoms),
                    other => return Err(unexpected(other, "',' or ']'")),
                }
            }
            other => return Err(unexpected(other, "a quoted atom specifier")),
        }
    }
}

fn next_significant(chars: &mut Peekable<Chars<'_>>) -> Option<char> {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
    chars.next()
}

fn expect(chars: &mut Peekable<Chars<'_>>, want: char) -> Result<()> {
    match next_significant(chars) {
        Some(c) if c == want => Ok(()),
        other => Err(unexpected(other, &format!("'{}'", want))),
    }
}

fn unexpected(found: Option<char>, wanted: &str) -> StrucdevError {
    match found {
        Some(c) => StrucdevError::Parse(format!("expected {} in atom groups, found '{}'", wanted, c)),
        None => StrucdevError::Parse(format!("expected {} in atom groups, found end of text", wanted)),
    }
}

fn checked_group(label: String, atoms: Vec<AtomSpec>) -> Result<AtomGroup> {
    if atoms.is_empty() {
        return Err(StrucdevError::Parse(format!("atom group {} is empty", label)));
    }
    Ok(AtomGroup { label, atoms })
}

/// Coordinates of every atom of `group`, in group order.
///
/// ATOM and HETATM records both count; the first record matching a
/// specifier wins.
///
/// # Errors
///
/// Returns [`StrucdevError::InvalidInput`] naming every atom not found.
pub fn resolve_group(structure: &Structure, group: &AtomGroup) -> Result<Vec<Point3D>> {
    let mut coords: Vec<Option<Point3D>> = alloc::vec![None; group.atoms.len()];
    for atom in &structure.atoms {
        for (slot, spec) in coords.iter_mut().zip(&group.atoms) {
            if slot.is_none() && spec.matches(atom.chain_id, atom.res_seq, &atom.name) {
                *slot = Some(atom.coords);
            }
        }
    }

    let missing: Vec<String> = coords
        .iter()
        .zip(&group.atoms)
        .filter(|(c, _)| c.is_none())
        .map(|(_, spec)| spec.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(StrucdevError::InvalidInput(format!(
            "{}: group {} is missing atom(s) {}",
            structure.id,
            group.label,
            missing.join(", ")
        )));
    }
    Ok(coords.into_iter().flatten().collect())
}

/// Centroid and plane of one resolved ring.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RingGeometry {
    pub label: String,
    pub plane: Plane,
}

/// Resolve `group` and fit its plane.
pub fn ring_geometry(structure: &Structure, group: &AtomGroup) -> Result<RingGeometry> {
    let coords = resolve_group(structure, group)?;
    let plane = fit_plane(&coords).map_err(|e| match e {
        StrucdevError::Degenerate(msg) => {
            StrucdevError::Degenerate(format!("group {}: {}", group.label, msg))
        }
        other => other,
    })?;
    Ok(RingGeometry {
        label: group.label.clone(),
        plane,
    })
}

/// Geometry of one pair of rings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StackingPair {
    pub first: String,
    pub second: String,
    /// Centroid distance in Angstroms.
    pub distance: f64,
    /// Interplanar angle in degrees, in `[0, 90]`.
    pub angle: f64,
}

/// Distance and angle for every unordered pair of `groups`, in group order.
pub fn stacking_pairs(structure: &Structure, groups: &[AtomGroup]) -> Result<Vec<StackingPair>> {
    let rings = groups
        .iter()
        .map(|g| ring_geometry(structure, g))
        .collect::<Result<Vec<_>>>()?;

    let mut pairs = Vec::new();
    for (i, a) in rings.iter().enumerate() {
        for b in &rings[i + 1..] {
            pairs.push(StackingPair {
                first: a.label.clone(),
                second: b.label.clone(),
                distance: a.plane.centroid.distance_to(&b.plane.centroid),
                angle: interplanar_angle(&a.plane, &b.plane),
            });
        }
    }
    Ok(pairs)
}
