use crate::assemble::{assemble_split, Warning, DEFAULT_SPLIT_BASE};
use crate::commands::write_atomically;
use crate::output::{self, NamedOutput};
use crate::page_range::ParseMode;
use crate::pdf::SourceDocument;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Where the split outputs go.
#[derive(Debug, Clone)]
pub enum SplitTarget {
    /// One zip archive holding every output.
    Archive(PathBuf),
    /// Individual PDF files in a directory.
    Directory(PathBuf),
}

#[derive(Debug, Clone, Default)]
pub struct SplitOptions {
    /// `;`-separated groups; blank splits into single pages.
    pub ranges: String,
    /// Prefix of every output name; defaults to the input's file stem.
    pub base_name: Option<String>,
    pub mode: ParseMode,
}

#[derive(Debug, Serialize)]
pub struct SplitReport {
    pub outputs: Vec<SplitOutput>,
    pub archive_path: Option<String>,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Serialize)]
pub struct SplitOutput {
    pub name: String,
    pub path: Option<String>,
    pub page_count: usize,
}

pub fn execute<P: AsRef<Path>>(
    input: P,
    options: &SplitOptions,
    target: &SplitTarget,
) -> Result<SplitReport> {
    let input = input.as_ref();
    let source = SourceDocument::open(input)
        .with_context(|| format!("Failed to load PDF: {}", input.display()))?;

    let base_name = match &options.base_name {
        Some(name) => name.as_str(),
        None => input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(DEFAULT_SPLIT_BASE),
    };

    let assembly = assemble_split(&source, &options.ranges, base_name, options.mode)?;
    let page_counts: Vec<usize> = assembly.outputs.iter().map(|o| o.pages.len()).collect();
    let built = output::build(&assembly.outputs)?;

    let (paths, archive_path) = match target {
        SplitTarget::Archive(path) => {
            let archive = output::archive(&built)?;
            write_atomically(path, &archive)?;
            (vec![None; built.len()], Some(path.display().to_string()))
        }
        SplitTarget::Directory(dir) => (write_all(dir, &built)?, None),
    };

    let outputs = built
        .into_iter()
        .zip(page_counts)
        .zip(paths)
        .map(|((output, page_count), path)| SplitOutput {
            name: output.name,
            path,
            page_count,
        })
        .collect();

    Ok(SplitReport {
        outputs,
        archive_path,
        warnings: assembly.warnings,
    })
}

/// Write every output into `dir`, or none of them.
///
/// Outputs are staged in a temporary directory inside `dir` and moved into
/// place once all of them are on disk. If a move fails, the files already
/// moved are removed again.
fn write_all(dir: &Path, outputs: &[NamedOutput]) -> Result<Vec<Option<String>>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    let staging = tempfile::TempDir::new_in(dir)
        .with_context(|| format!("Failed to stage outputs in: {}", dir.display()))?;

    for output in outputs {
        std::fs::write(staging.path().join(&output.name), &output.bytes)
            .with_context(|| format!("Failed to write {}", output.name))?;
    }

    let mut placed: Vec<PathBuf> = Vec::with_capacity(outputs.len());
    for output in outputs {
        let path = dir.join(&output.name);
        if let Err(e) = std::fs::rename(staging.path().join(&output.name), &path) {
            for path in &placed {
                let _ = std::fs::remove_file(path);
            }
            return Err(e).with_context(|| format!("Failed to write {}", path.display()));
        }
        placed.push(path);
    }

    Ok(placed
        .iter()
        .map(|path| Some(path.display().to_string()))
        .collect())
}

pub fn run<P: AsRef<Path>>(input: P, options: &SplitOptions, target: &SplitTarget) -> Result<()> {
    let report = execute(input, options, target)?;

    match &report.archive_path {
        Some(path) => println!("Split into {} file(s) in {}", report.outputs.len(), path),
        None => {
            for output in &report.outputs {
                if let Some(path) = &output.path {
                    println!("{} ({} page(s))", path, output.page_count);
                }
            }
            println!("Split into {} file(s)", report.outputs.len());
        }
    }

    Ok(())
}
