//! Minimal CLI: compare → (json | report)
use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::diff::SchemaDiff;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// compare two schema versions embedded in a text blob and report the drift
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// compare and print the diff as JSON
    Json(JsonOut),
    /// compare and print a human-readable report
    Report(ReportOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more inputs. May be literal paths, quoted glob patterns, or '-' for stdin
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug)]
struct JsonOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(Args, Debug)]
struct ReportOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// Read every input blob and compare it. Returns one `(label, diff)` per
    /// input, in argument order.
    fn load_compare(&self) -> Result<Vec<(String, SchemaDiff)>> {
        let mut out = Vec::new();
        for (label, source) in self.load_sources()? {
            let diff = crate::diff::compare(&source)
                .with_context(|| format!("failed to compare schemas from {label}"))?;
            out.push((label, diff));
        }
        Ok(out)
    }

    fn load_sources(&self) -> Result<Vec<(String, String)>> {
        let mut out = Vec::new();
        for raw in &self.input {
            if raw == "-" {
                let mut source = String::new();
                std::io::stdin()
                    .read_to_string(&mut source)
                    .context("failed to read stdin")?;
                out.push(("<stdin>".to_string(), source));
                continue;
            }
            for path in resolve_file_path_patterns([raw.as_str()])? {
                let label = path.to_string_lossy().to_string();
                let source = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read source file: {label}"))?;
                out.push((label, source));
            }
        }
        Ok(out)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Json(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                let results = target.input_settings.load_compare()?;
                let diffs = results.into_iter().map(|(_, d)| d).collect::<Vec<_>>();
                let src = match diffs.as_slice() {
                    [single] => crate::render::to_json_pretty(single)?,
                    many => crate::render::to_json_pretty_many(many)?,
                };
                write_out(target.out.as_deref(), &src)
            }
            Command::Report(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                let results = target.input_settings.load_compare()?;
                let many = results.len() > 1;
                let mut src = String::new();
                for (label, diff) in &results {
                    if many {
                        src.push_str(&format!("== {label} ==\n"));
                    }
                    src.push_str(&crate::render::report(diff));
                }
                write_out(target.out.as_deref(), &src)
            }
        }
    }
}

fn write_out(out: Option<&std::path::Path>, src: &str) -> Result<()> {
    if let Some(out) = out {
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(out, src)
            .with_context(|| format!("failed to write {}", out.display()))?;
    } else {
        println!("{src}");
    }
    Ok(())
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            // Treat as a glob pattern
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                let p = entry?;
                matched_any = true;
                out.push(p);
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            // Treat as a literal path
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_paths_pass_through_untouched() {
        let paths = resolve_file_path_patterns(["a/b.txt", "c.txt"]).unwrap();
        assert_eq!(paths, vec![PathBuf::from("a/b.txt"), PathBuf::from("c.txt")]);
    }

    #[test]
    fn unmatched_glob_is_an_error() {
        let err = resolve_file_path_patterns(["no/such/dir/*.does-not-exist"]);
        assert!(err.is_err());
    }
}
