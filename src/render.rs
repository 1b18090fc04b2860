//! Output surfaces for a computed diff: pretty JSON and a colored terminal
//! report. Both consume the finished [`SchemaDiff`]; nothing here feeds back
//! into parsing or diffing.

use colored::Colorize;

use crate::diff::{DiffEntry, SchemaDiff};
use crate::schema::Field;

pub fn to_json_pretty(diff: &SchemaDiff) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(diff)?)
}

pub fn to_json_pretty_many(diffs: &[SchemaDiff]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(diffs)?)
}

/// Plain-text report with colored section headers. Colors degrade to plain
/// text when the stream is not a tty (handled by `colored` itself).
pub fn report(diff: &SchemaDiff) -> String {
    let mut out = String::new();

    section(&mut out, &"added".green().bold().to_string(), &diff.added);
    section(&mut out, &"removed".red().bold().to_string(), &diff.removed);
    section(&mut out, &"modified".yellow().bold().to_string(), &diff.modified);

    out.push_str(&format!(
        "{} added, {} removed, {} modified\n",
        diff.added.len(),
        diff.removed.len(),
        diff.modified.len()
    ));
    out
}

fn section(out: &mut String, header: &str, entries: &[DiffEntry]) {
    out.push_str(header);
    out.push('\n');
    if entries.is_empty() {
        out.push_str("  (none)\n\n");
        return;
    }

    let path_w = column_width("path", entries.iter().map(|e| e.path.len()));
    let type_w = column_width("type", entries.iter().map(|e| e.type_tag.len()));

    out.push_str(&format!(
        "  {:path_w$}  {:type_w$}  {:8}  children\n",
        "path", "type", "nullable"
    ));
    for e in entries {
        out.push_str(&format!(
            "  {:path_w$}  {:type_w$}  {:<8}  {}\n",
            e.path,
            e.type_tag,
            e.nullable,
            children_cell(e.children.as_deref()),
        ));
    }
    out.push('\n');
}

fn column_width(header: &str, lens: impl Iterator<Item = usize>) -> usize {
    lens.chain(std::iter::once(header.len())).max().unwrap_or(0)
}

fn children_cell(children: Option<&[Field]>) -> String {
    match children {
        None => "-".to_string(),
        Some(fields) => fields
            .iter()
            .map(|f| format!("{}: {}", f.name, f.signature()))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff_schemas;
    use crate::schema::Field;

    fn sample_diff() -> SchemaDiff {
        let old = vec![Field::primitive("id", "LongType()", false)];
        let new = vec![
            Field::primitive("id", "LongType()", false),
            Field::composite(
                "geo",
                vec![Field::primitive("lat", "DoubleType()", false)],
                true,
            ),
        ];
        diff_schemas(&old, &new)
    }

    #[test]
    fn json_has_the_three_lists() {
        let src = to_json_pretty(&sample_diff()).unwrap();
        let v: serde_json::Value = serde_json::from_str(&src).unwrap();
        assert!(v["added"].is_array());
        assert!(v["removed"].is_array());
        assert!(v["modified"].is_array());
        assert_eq!(v["added"][0]["path"], "geo");
    }

    #[test]
    fn report_lists_paths_and_counts() {
        colored::control::set_override(false);
        let text = report(&sample_diff());
        assert!(text.contains("geo"));
        assert!(text.contains("lat: DoubleType()"));
        assert!(text.contains("1 added, 0 removed, 0 modified"));
    }

    #[test]
    fn report_marks_empty_sections() {
        colored::control::set_override(false);
        let old = vec![Field::primitive("id", "LongType()", false)];
        let text = report(&diff_schemas(&old, &old));
        assert!(text.contains("(none)"));
        assert!(text.contains("0 added, 0 removed, 0 modified"));
    }
}
