//! Structural diff over two schema trees.
//!
//! Three categories: `added` (in new, not in old), `removed` (in old, not in
//! new), `modified` (same name, different type or nullability). Nested
//! differences are flattened to dot paths; a field missing from the other
//! side is emitted wholesale as a single entry, full subtree attached,
//! without flattening its descendants.

use serde::Serialize;

use crate::parse::{parse_comparison, ParseError};
use crate::schema::{Field, FieldType, Schema};

/// One detected difference. `path` dot-joins field names from the root to
/// the differing field; `children` carries the full subtree for composite
/// entries and is absent for primitives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub type_tag: String,
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Field>>,
}

impl DiffEntry {
    fn wholesale(field: &Field) -> Self {
        DiffEntry {
            path: field.name.clone(),
            type_tag: field.type_tag().to_string(),
            nullable: field.nullable,
            children: field.children().map(<[Field]>::to_vec),
        }
    }

    fn prefixed(mut self, name: &str) -> Self {
        self.path = format!("{name}.{}", self.path);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaDiff {
    pub added: Vec<DiffEntry>,
    pub removed: Vec<DiffEntry>,
    pub modified: Vec<DiffEntry>,
}

impl SchemaDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

/// Pure top-level entry point: raw comparison blob in, three lists out.
pub fn compare(text: &str) -> Result<SchemaDiff, ParseError> {
    let (old, new) = parse_comparison(text)?;
    Ok(diff_schemas(&old, &new))
}

pub fn diff_schemas(old: &Schema, new: &Schema) -> SchemaDiff {
    SchemaDiff {
        added: diff_added(new, old),
        removed: diff_added(old, new),
        modified: diff_modified(old, new),
    }
}

/// Matching is by name, first occurrence only. Duplicate sibling names are
/// legal input; everything after the first occurrence is never matched
/// against. That is the documented policy, not an accident.
fn find_by_name<'a>(fields: &'a [Field], name: &str) -> Option<&'a Field> {
    fields.iter().find(|f| f.name == name)
}

/// Fields present in `newer` with no same-named sibling in `older`.
/// `removed` is the same walk with the arguments swapped.
pub fn diff_added(newer: &[Field], older: &[Field]) -> Vec<DiffEntry> {
    let mut out = Vec::new();
    for field in newer {
        match find_by_name(older, &field.name) {
            // whole subtree as one unit, descendants not flattened
            None => out.push(DiffEntry::wholesale(field)),
            Some(matched) => {
                if let FieldType::Composite(children) = &field.ty {
                    // recurse even when the match is not composite; its
                    // missing children then all surface as added
                    let sibling = matched.children().unwrap_or(&[]);
                    for entry in diff_added(children, sibling) {
                        out.push(entry.prefixed(&field.name));
                    }
                }
            }
        }
    }
    out
}

/// Same-named fields whose type or nullability changed. Unmatched names are
/// skipped here (they belong to added/removed). For composites only child
/// differences surface; a container-level-only change (e.g. the wrapper's
/// nullability flips while every child matches) yields no entry.
pub fn diff_modified(older: &[Field], newer: &[Field]) -> Vec<DiffEntry> {
    let mut out = Vec::new();
    for field in newer {
        let Some(matched) = find_by_name(older, &field.name) else {
            continue;
        };
        if field == matched {
            continue;
        }
        match &field.ty {
            FieldType::Composite(children) => {
                let sibling = matched.children().unwrap_or(&[]);
                for entry in diff_modified(sibling, children) {
                    out.push(entry.prefixed(&field.name));
                }
            }
            FieldType::Primitive(_) => out.push(DiffEntry::wholesale(field)),
        }
    }
    out
}

// ------------------------------- Tests ------------------------------------ //
