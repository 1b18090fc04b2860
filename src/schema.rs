// Strongly-typed schema tree. No raw text here.

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Marker emitted for composite fields wherever a type tag is rendered as a
/// plain string (diff entries, JSON output).
pub const COMPOSITE_TAG: &str = "Composite";

/// One schema version: an ordered run of top-level fields.
/// Sibling names are not guaranteed unique; the differ matches on the
/// first occurrence only.
pub type Schema = Vec<Field>;

/// Explicit tagged discriminant: a composite with zero declared children is
/// still a composite, never a primitive with a missing child list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// Opaque leaf token, kept verbatim (may carry its own argument list,
    /// e.g. `DecimalType(10,2)`).
    Primitive(String),
    Composite(Vec<Field>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
    pub nullable: bool,
}

impl Field {
    pub fn primitive(name: &str, ty: &str, nullable: bool) -> Self {
        Field { name: name.into(), ty: FieldType::Primitive(ty.into()), nullable }
    }

    pub fn composite(name: &str, children: Vec<Field>, nullable: bool) -> Self {
        Field { name: name.into(), ty: FieldType::Composite(children), nullable }
    }

    /// The primitive token, or [`COMPOSITE_TAG`] for composites.
    pub fn type_tag(&self) -> &str {
        match &self.ty {
            FieldType::Primitive(t) => t,
            FieldType::Composite(_) => COMPOSITE_TAG,
        }
    }

    /// Child fields for composites; `None` (not empty) for primitives.
    /// The differ relies on this distinction when emitting subtrees.
    pub fn children(&self) -> Option<&[Field]> {
        match &self.ty {
            FieldType::Composite(children) => Some(children),
            FieldType::Primitive(_) => None,
        }
    }

    /// Compact one-line signature, used by the terminal report.
    pub fn signature(&self) -> String {
        match &self.ty {
            FieldType::Primitive(t) => t.clone(),
            FieldType::Composite(children) => {
                let inner = children
                    .iter()
                    .map(|c| format!("{}: {}", c.name, c.signature()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{{{inner}}}")
            }
        }
    }
}

// JSON projection: `children` is present only for composites. Primitives get
// no `children` key at all, so consumers can tell "composite with zero
// children" apart from "primitive".
impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let n = if matches!(self.ty, FieldType::Composite(_)) { 4 } else { 3 };
        let mut s = serializer.serialize_struct("Field", n)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("type", self.type_tag())?;
        s.serialize_field("nullable", &self.nullable)?;
        if let FieldType::Composite(children) = &self.ty {
            s.serialize_field("children", children)?;
        }
        s.end()
    }
}

// ------------------------------- Tests ------------------------------------ //
