use crate::assemble::assemble_rotated;
use crate::commands::write_atomically;
use crate::error::PageError;
use crate::output;
use crate::pdf::{Rotation, SourceDocument};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct RotateReport {
    pub output_path: String,
    pub page_count: usize,
    pub degrees: i64,
}

/// Where the rotated copy of `input` goes when no output is given:
/// `rotated_<name>` next to the input.
pub fn default_output(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());
    input.with_file_name(format!("rotated_{}", name))
}

/// Turn every page of `input` by `degrees` (a multiple of 90) and write the
/// result to `output`.
pub fn execute<P: AsRef<Path>>(
    input: P,
    degrees: i64,
    output: Option<&Path>,
) -> Result<RotateReport> {
    let input = input.as_ref();
    let rotation = Rotation::from_degrees(degrees)?;
    let source = SourceDocument::open(input)
        .with_context(|| format!("Failed to load PDF: {}", input.display()))?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input));
    let name = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let assembly = assemble_rotated(&source, rotation, &name);
    let rotated = output::build(&assembly.outputs)?
        .into_iter()
        .next()
        .ok_or(PageError::NothingProduced)?;

    write_atomically(&output, &rotated.bytes)?;

    Ok(RotateReport {
        output_path: output.display().to_string(),
        page_count: source.page_count() as usize,
        degrees: rotation.degrees(),
    })
}

pub fn run<P: AsRef<Path>>(input: P, degrees: i64, output: Option<&Path>) -> Result<()> {
    let report = execute(input, degrees, output)?;

    println!(
        "Rotated {} page(s) by {}° into {}",
        report.page_count, report.degrees, report.output_path
    );

    Ok(())
}
