//! Text → schema trees.
//!
//! The input blob carries the new schema first, then a `| Previous:` label,
//! then the old schema:
//!
//! ```text
//! StructType([...new...]) | Previous: StructType([...old...])
//! ```
//!
//! Section *location* uses a couple of anchored regexes; section *consumption*
//! never does. Type spans can nest (`StructType([...])` inside a field) and
//! primitive tokens can carry their own argument commas (`DecimalType(10,2)`),
//! so every span is delimited by bracket/paren depth counting in a
//! recursive-descent reader. Parsing is all-or-nothing per schema: the first
//! grammar violation aborts with its absolute byte offset.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::schema::{Field, FieldType, Schema};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The blob does not contain both a recognizable new and old section.
    #[error("input does not contain both a new and a `Previous:` schema section")]
    MalformedInput,

    /// A field span violates the grammar. `offset` is a byte position into
    /// the original input blob.
    #[error("unparsable field at byte {offset}: {reason}")]
    UnparsableField { offset: usize, reason: String },
}

/// `new` first, separator, then the labeled `old` section.
static SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\|\s*Previous:").unwrap());
static OPENER: Lazy<Regex> = Lazy::new(|| Regex::new(r"StructType\(\[").unwrap());

/// Locate the two sections. Returns `(old, new)` as `(text_slice, base_offset)`
/// pairs, where each slice starts at its `StructType([` opener and the base
/// offset is the opener's byte position in `text`.
pub fn extract_sections(text: &str) -> Result<((&str, usize), (&str, usize)), ParseError> {
    let sep = SEPARATOR.find(text).ok_or(ParseError::MalformedInput)?;

    let new_open = OPENER.find(&text[..sep.start()]).ok_or(ParseError::MalformedInput)?;
    let old_open = OPENER.find(&text[sep.end()..]).ok_or(ParseError::MalformedInput)?;
    let old_base = sep.end() + old_open.start();

    let old = (&text[old_base..], old_base);
    let new = (&text[new_open.start()..sep.start()], new_open.start());
    Ok((old, new))
}

/// Parse one `StructType([...])` span. `base` is the span's byte offset in
/// the original blob, used to report absolute error offsets.
pub fn parse_fields(section: &str, base: usize) -> Result<Schema, ParseError> {
    let mut reader = Reader { src: section, pos: 0, base };
    let fields = reader.struct_type()?;
    // trailing text after the balanced span is ignored (labels, noise)
    Ok(fields)
}

/// Extract and parse both sections of a comparison blob.
/// Returns `(old, new)`.
pub fn parse_comparison(text: &str) -> Result<(Schema, Schema), ParseError> {
    let ((old_text, old_base), (new_text, new_base)) = extract_sections(text)?;
    let old = parse_fields(old_text, old_base)?;
    let new = parse_fields(new_text, new_base)?;
    Ok((old, new))
}

// --------------------------- Recursive descent ----------------------------- //

struct Reader<'a> {
    src: &'a str,
    pos: usize,
    base: usize,
}

impl<'a> Reader<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn offset(&self) -> usize {
        self.base + self.pos
    }

    fn fail<T>(&self, reason: impl Into<String>) -> Result<T, ParseError> {
        Err(ParseError::UnparsableField { offset: self.offset(), reason: reason.into() })
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn eat(&mut self, lit: &str) -> bool {
        if self.rest().starts_with(lit) {
            self.pos += lit.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, lit: &str) -> Result<(), ParseError> {
        if self.eat(lit) {
            Ok(())
        } else {
            self.fail(format!("expected `{lit}`"))
        }
    }

    /// `StructType([` FieldList? `])`
    fn struct_type(&mut self) -> Result<Vec<Field>, ParseError> {
        self.expect("StructType([")?;
        self.skip_ws();

        let mut fields = Vec::new();
        if self.eat("])") {
            return Ok(fields); // zero declared children
        }
        loop {
            fields.push(self.field()?);
            self.skip_ws();
            if self.eat(",") {
                self.skip_ws();
                continue;
            }
            self.expect("])")?;
            return Ok(fields);
        }
    }

    /// `StructField('` Name `',` Type `,` Bool `)`
    fn field(&mut self) -> Result<Field, ParseError> {
        self.expect("StructField(")?;
        self.skip_ws();
        self.expect("'")?;
        let name = self.field_name()?;
        self.expect("'")?;
        self.skip_ws();
        self.expect(",")?;
        self.skip_ws();
        let ty = self.type_span()?;
        self.skip_ws();
        self.expect(",")?;
        self.skip_ws();
        let nullable = self.bool_lit()?;
        self.skip_ws();
        self.expect(")")?;
        Ok(Field { name, ty, nullable })
    }

    fn field_name(&mut self) -> Result<String, ParseError> {
        let rest = self.rest();
        let end = match rest.find('\'') {
            Some(i) => i,
            None => return self.fail("unterminated field name"),
        };
        if end == 0 {
            return self.fail("empty field name");
        }
        let name = &rest[..end];
        self.pos += end;
        Ok(name.to_string())
    }

    /// One type position: either a nested balanced composite, or a primitive
    /// token consumed up to the first `,` or `)` at depth zero. Never splits
    /// at commas inside a token's own argument list.
    fn type_span(&mut self) -> Result<FieldType, ParseError> {
        if self.rest().starts_with("StructType([") {
            return Ok(FieldType::Composite(self.struct_type()?));
        }

        let start = self.pos;
        let mut depth = 0usize;
        for c in self.rest().chars() {
            match c {
                '(' | '[' => depth += 1,
                ')' | ']' if depth == 0 => break,
                ')' | ']' => depth -= 1,
                ',' if depth == 0 => break,
                _ => {}
            }
            self.pos += c.len_utf8();
        }
        if depth != 0 {
            self.pos = start;
            return self.fail("unbalanced brackets in type");
        }
        let token = self.src[start..self.pos].trim();
        if token.is_empty() {
            self.pos = start;
            return self.fail("empty type");
        }
        Ok(FieldType::Primitive(token.to_string()))
    }

    fn bool_lit(&mut self) -> Result<bool, ParseError> {
        if self.eat("True") {
            Ok(true)
        } else if self.eat("False") {
            Ok(false)
        } else {
            self.fail("expected boolean literal `True` or `False`")
        }
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;

    fn parse_one(s: &str) -> Schema {
        parse_fields(s, 0).unwrap()
    }

    #[test]
    fn flat_schema_round_trips() {
        let fields = parse_one(
            "StructType([StructField('id', LongType(), False), \
             StructField('name', StringType(), True)])",
        );
        assert_eq!(
            fields,
            vec![
                Field::primitive("id", "LongType()", false),
                Field::primitive("name", "StringType()", true),
            ]
        );
    }

    #[test]
    fn empty_composite_is_depth_zero() {
        assert_eq!(parse_one("StructType([])"), vec![]);
    }

    #[test]
    fn nested_composite_with_internal_commas_is_one_field() {
        // the type position contains commas; must not be split there
        let fields = parse_one(
            "StructType([StructField('addr', StructType([\
             StructField('zip', StringType(), True), \
             StructField('city', StringType(), True)]), True)])",
        );
        assert_eq!(
            fields,
            vec![Field::composite(
                "addr",
                vec![
                    Field::primitive("zip", "StringType()", true),
                    Field::primitive("city", "StringType()", true),
                ],
                true,
            )]
        );
    }

    #[test]
    fn deep_nesting_parses() {
        let fields = parse_one(
            "StructType([StructField('a', StructType([\
             StructField('b', StructType([\
             StructField('c', IntegerType(), False)]), True)]), True)])",
        );
        let a = &fields[0];
        let b = &a.children().unwrap()[0];
        let c = &b.children().unwrap()[0];
        assert_eq!(c.name, "c");
        assert_eq!(c.type_tag(), "IntegerType()");
    }

    #[test]
    fn primitive_argument_commas_stay_in_the_token() {
        let fields = parse_one(
            "StructType([StructField('price', DecimalType(10,2), True), \
             StructField('qty', IntegerType(), False)])",
        );
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].type_tag(), "DecimalType(10,2)");
    }

    #[test]
    fn whitespace_and_newlines_are_tolerated() {
        let fields = parse_one(
            "StructType([\n  StructField('id',  LongType() , False),\n  \
             StructField('tag', StringType(), True)\n])",
        );
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].type_tag(), "LongType()");
    }

    #[test]
    fn missing_separator_is_malformed_input() {
        let err = parse_comparison("StructType([StructField('x', LongType(), True)])");
        assert_eq!(err, Err(ParseError::MalformedInput));
    }

    #[test]
    fn missing_old_section_is_malformed_input() {
        let err = parse_comparison("StructType([]) | Previous: nothing here");
        assert_eq!(err, Err(ParseError::MalformedInput));
    }

    #[test]
    fn sections_come_back_in_old_new_order() {
        let text = "StructType([StructField('b', StringType(), True)]) \
                    | Previous: StructType([StructField('a', LongType(), False)])";
        let (old, new) = parse_comparison(text).unwrap();
        assert_eq!(old, vec![Field::primitive("a", "LongType()", false)]);
        assert_eq!(new, vec![Field::primitive("b", "StringType()", true)]);
    }

    #[test]
    fn surrounding_noise_is_ignored() {
        let text = "Detected drift!\nStructType([StructField('x', LongType(), True)]) \
                    | Previous: StructType([StructField('x', LongType(), True)]) (from run 42)";
        let (old, new) = parse_comparison(text).unwrap();
        assert_eq!(old, new);
    }

    #[test]
    fn bad_boolean_reports_absolute_offset() {
        let text = "StructField('x', LongType(), Yes)])";
        let err = parse_fields(&format!("StructType([{text}"), 100).unwrap_err();
        match err {
            ParseError::UnparsableField { offset, reason } => {
                // "StructType([" is 12 bytes; "StructField('x', LongType(), " is 29
                assert_eq!(offset, 100 + 12 + 29);
                assert!(reason.contains("boolean"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unbalanced_type_brackets_abort_the_schema() {
        let err = parse_fields("StructType([StructField('x', ArrayType(LongType(, True)])", 0);
        assert!(matches!(err, Err(ParseError::UnparsableField { .. })));
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = parse_fields("StructType([StructField('', LongType(), True)])", 0);
        assert!(matches!(
            err,
            Err(ParseError::UnparsableField { reason, .. }) if reason.contains("name")
        ));
    }

    #[test]
    fn no_partial_tree_on_late_failure() {
        // first field fine, second broken: the whole schema must fail
        let err = parse_fields(
            "StructType([StructField('a', LongType(), True), StructField('b', , True)])",
            0,
        );
        assert!(matches!(err, Err(ParseError::UnparsableField { .. })));
    }
}
