//! Command-line interface for the L5X-ST compiler (SPEC_FULL §6).
//!
//! `clap`-derived argument parsing for the two sub-commands, plus the
//! recursive, case-insensitive L5X file discovery used by `l5x2st -d`.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "l5x-st")]
#[command(about = "Convert between Rockwell L5X and consolidated IEC 61131-3 Structured Text")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert L5X to Structured Text.
    L5x2st {
        /// Input L5X file to convert.
        #[arg(short = 'i', long = "input", conflicts_with = "directory")]
        input: Option<PathBuf>,

        /// Directory containing L5X files to convert.
        #[arg(short = 'd', long = "directory", conflicts_with = "input")]
        directory: Option<PathBuf>,

        /// Output ST file.
        #[arg(short = 'o', long = "output", default_value = "output.st")]
        output: PathBuf,

        /// Route through the IR extractor and validator before emission.
        #[arg(long = "use-ir")]
        use_ir: bool,

        /// Enable verbose diagnostic output.
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },
    /// Convert Structured Text to L5X.
    St2l5x {
        /// Input ST file to convert.
        #[arg(short = 'i', long = "input")]
        input: PathBuf,

        /// Output L5X file.
        #[arg(short = 'o', long = "output")]
        output: PathBuf,

        /// Route through ST → L5X → IR → validator; reject on validation errors.
        #[arg(long = "use-ir")]
        use_ir: bool,

        /// Enable verbose diagnostic output.
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },
}

/// Error constructing a [`Cli`] invocation's arguments, distinct from
/// `clap`'s own parse errors (which exit the process before this type is
/// ever touched).
#[derive(Debug, Clone, PartialEq)]
pub struct ArgsError {
    message: String,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ArgsError {}

impl ArgsError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Either an `-i` file or a `-d` directory for `l5x2st`; exactly one is
/// required (enforced again here, beyond `clap`'s `conflicts_with`, since
/// neither being present is not itself a conflict clap can express).
pub enum L5xSource {
    File(PathBuf),
    Directory(PathBuf),
}

pub fn l5x_source(input: Option<PathBuf>, directory: Option<PathBuf>) -> Result<L5xSource, ArgsError> {
    match (input, directory) {
        (Some(path), None) => Ok(L5xSource::File(path)),
        (None, Some(path)) => Ok(L5xSource::Directory(path)),
        (Some(_), Some(_)) => Err(ArgsError::new("-i and -d are mutually exclusive")),
        (None, None) => Err(ArgsError::new("one of -i or -d is required")),
    }
}

/// Recursively discover `.l5x` files under `dir`, sorted case-insensitively
/// by file name (SPEC_FULL §6).
pub fn discover_l5x_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    walk(dir, &mut found)?;
    found.sort_by(|a, b| file_name_lower(a).cmp(&file_name_lower(b)));
    Ok(found)
}

fn file_name_lower(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

fn walk(dir: &Path, found: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            walk(&path, found)?;
        } else if path
            .extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("l5x"))
            .unwrap_or(false)
        {
            found.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l5x_source_requires_exactly_one() {
        assert!(l5x_source(None, None).is_err());
        assert!(l5x_source(Some("a".into()), Some("b".into())).is_err());
        assert!(l5x_source(Some("a".into()), None).is_ok());
        assert!(l5x_source(None, Some("b".into())).is_ok());
    }

    #[test]
    fn discover_l5x_files_is_recursive_and_case_insensitive_sorted() {
        let dir = std::env::temp_dir().join(format!(
            "l5x_st_compiler_test_{:?}",
            std::thread::current().id()
        ));
        let sub = dir.join("nested");
        std::fs::create_dir_all(&sub).unwrap();
        std::fs::write(dir.join("b.L5X"), "").unwrap();
        std::fs::write(dir.join("A.l5x"), "").unwrap();
        std::fs::write(sub.join("c.l5x"), "").unwrap();
        std::fs::write(dir.join("ignore.txt"), "").unwrap();

        let files = discover_l5x_files(&dir).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["A.l5x", "b.L5X", "c.l5x"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
