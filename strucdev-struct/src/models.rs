//! Splitting multi-model PDB text into its members.
//!
//! Ensemble refinement and NMR deposits store every member between
//! `MODEL`/`ENDMDL` records. [`split_models`] walks the text with a two-state
//! machine and returns one [`ModelMember`] per model; each member is a
//! self-contained PDB text (preamble, coordinate records, `END`).

use strucdev_core::{Result, StrucdevError};

use crate::pdb::{parse_pdb, record_kind, safe_slice, select_points};
use crate::selection::Selection;
use crate::types::{PointSet, Structure};

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

/// One member of a multi-model file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelMember {
    /// Model serial from the `MODEL` record, or the running count when the
    /// record carries none. An implicit single model has serial 1.
    pub serial: u32,
    /// Preamble and coordinate lines, without `MODEL`/`ENDMDL`.
    pub lines: Vec<String>,
}

impl ModelMember {
    /// PDB text of this member, terminated by an `END` record.
    pub fn to_pdb_string(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("END\n");
        out
    }

    /// Parse the member's coordinate records.
    pub fn structure(&self) -> Result<Structure> {
        parse_pdb(&self.to_pdb_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitState {
    OutsideModel,
    InsideModel,
}

/// Split PDB text into its models.
///
/// Non-coordinate records before the first `MODEL` form a preamble that is
/// copied into every member. Text with coordinate records before any `MODEL`
/// is returned whole as a single implicit model. Anything after the last
/// `ENDMDL` is dropped.
///
/// # Errors
///
/// - [`StrucdevError::Format`] for a `MODEL` inside an open model or an
///   `ENDMDL` with no open model.
/// - [`StrucdevError::Parse`] when the text contains no model at all.
pub fn split_models(input: &str) -> Result<Vec<ModelMember>> {
    let mut state = SplitState::OutsideModel;
    let mut preamble: Vec<String> = Vec::new();
    let mut members: Vec<ModelMember> = Vec::new();
    let mut current: Option<ModelMember> = None;
    let mut seen_model = false;

    for (idx, raw) in input.lines().enumerate() {
        let line = raw.trim_end();
        let line_no = idx + 1;
        let is_model = line.starts_with("MODEL");
        let is_endmdl = line.starts_with("ENDMDL");

        match state {
            SplitState::OutsideModel => {
                if is_model {
                    let serial = model_serial(line).unwrap_or(members.len() as u32 + 1);
                    let mut member = ModelMember {
                        serial,
                        lines: Vec::with_capacity(preamble.len()),
                    };
                    member.lines.extend(preamble.iter().cloned());
                    current = Some(member);
                    seen_model = true;
                    state = SplitState::InsideModel;
                } else if is_endmdl {
                    return Err(StrucdevError::Format(format!(
                        "line {}: ENDMDL without a matching MODEL",
                        line_no
                    )));
                } else if !seen_model {
                    if record_kind(line).is_some() {
                        return Ok(alloc::vec![implicit_model(input)]);
                    }
                    if !is_terminal(line) {
                        preamble.push(String::from(line));
                    }
                }
            }
            SplitState::InsideModel => {
                if is_model {
                    return Err(StrucdevError::Format(format!(
                        "line {}: MODEL record inside an unterminated model",
                        line_no
                    )));
                } else if is_endmdl {
                    if let Some(member) = current.take() {
                        members.push(member);
                    }
                    state = SplitState::OutsideModel;
                } else if let Some(member) = current.as_mut() {
                    if !is_terminal(line) {
                        member.lines.push(String::from(line));
                    }
                }
            }
        }
    }

    // End of input flushes an unterminated final model.
    if let Some(member) = current.take() {
        members.push(member);
    }

    if members.is_empty() {
        return Err(StrucdevError::Parse(
            "no MODEL or coordinate records found".into(),
        ));
    }
    Ok(members)
}

/// Parse every model of `input` and extract the selected points of each.
///
/// Members are labelled `<stem>_model_<serial>`, the same names
/// [`split_file`] gives the files it writes.
pub fn model_point_sets(input: &str, selection: &Selection, stem: &str) -> Result<Vec<PointSet>> {
    split_models(input)?
        .iter()
        .map(|member| {
            let structure = member.structure()?;
            select_points(
                &structure,
                selection,
                format!("{}_model_{}", stem, member.serial),
            )
        })
        .collect()
}

fn implicit_model(input: &str) -> ModelMember {
    ModelMember {
        serial: 1,
        lines: input
            .lines()
            .map(str::trim_end)
            .filter(|l| !is_terminal(l))
            .map(String::from)
            .collect(),
    }
}

fn model_serial(line: &str) -> Option<u32> {
    let field = safe_slice(line, 10, 14).trim();
    let field = if field.is_empty() {
        line.get(5..).unwrap_or("").trim()
    } else {
        field
    };
    field.parse().ok()
}

fn is_terminal(line: &str) -> bool {
    line == "END" || line.starts_with("END ") || line.trim().is_empty()
}

/// Split a multi-model PDB file into `<stem>_model_<n>.pdb` files.
///
/// Files are written to `out_dir`, or next to the input when `None`. Returns
/// the written paths in model order.
#[cfg(feature = "std")]
pub fn split_file(
    path: impl AsRef<::std::path::Path>,
    out_dir: Option<&::std::path::Path>,
) -> Result<Vec<::std::path::PathBuf>> {
    let path = path.as_ref();
    let text = crate::pdb::read_text(path)?;
    let members = split_models(&text)?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("model"));
    let dir = match out_dir {
        Some(d) => d.to_path_buf(),
        None => path
            .parent()
            .map(::std::path::Path::to_path_buf)
            .unwrap_or_default(),
    };
    write_members(&members, &dir, &stem)
}

/// Write each member to `<dir>/<stem>_model_<serial>.pdb`.
#[cfg(feature = "std")]
pub fn write_members(
    members: &[ModelMember],
    dir: &::std::path::Path,
    stem: &str,
) -> Result<Vec<::std::path::PathBuf>> {
    let mut written = Vec::with_capacity(members.len());
    for member in members {
        let out = dir.join(format!("{}_model_{}.pdb", stem, member.serial));
        ::std::fs::write(&out, member.to_pdb_string()).map_err(|e| {
            StrucdevError::Io(::std::io::Error::new(
                e.kind(),
                format!("{}: {}", out.display(), e),
            ))
        })?;
        written.push(out);
    }
    Ok(written)
}
