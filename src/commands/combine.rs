use crate::assemble::{assemble_merge, MergeSelection, Warning, MERGED_NAME};
use crate::commands::write_atomically;
use crate::error::PageError;
use crate::output;
use crate::page_range::ParseMode;
use crate::pdf::SourceDocument;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct CombineReport {
    pub output_path: String,
    pub input_count: usize,
    pub page_count: usize,
    pub warnings: Vec<Warning>,
}

/// Take the selected pages of every input, in input order, and write them to
/// `output` as one PDF.
///
/// `pages[i]` is the page specification for `inputs[i]`; missing or blank
/// specifications select every page. Any unreadable input aborts the whole
/// request before anything is written.
pub fn execute<P: AsRef<Path>>(
    inputs: &[P],
    pages: &[String],
    output: &Path,
    mode: ParseMode,
) -> Result<CombineReport> {
    if inputs.is_empty() {
        anyhow::bail!("No input files specified");
    }
    if pages.len() > inputs.len() {
        anyhow::bail!(
            "{} page specification(s) given for {} input file(s)",
            pages.len(),
            inputs.len()
        );
    }

    let sources = inputs
        .iter()
        .map(|input| {
            SourceDocument::open(input)
                .with_context(|| format!("Failed to load PDF: {}", input.as_ref().display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let selections: Vec<MergeSelection> = sources
        .iter()
        .enumerate()
        .map(|(i, source)| MergeSelection {
            source,
            spec: pages.get(i).map(String::as_str).unwrap_or(""),
        })
        .collect();

    let name = output
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(MERGED_NAME);
    let assembly = assemble_merge(&selections, name, mode)?;
    let merged = output::build(&assembly.outputs)?
        .into_iter()
        .next()
        .ok_or(PageError::NothingProduced)?;
    let page_count = assembly.outputs[0].pages.len();

    write_atomically(output, &merged.bytes)?;

    Ok(CombineReport {
        output_path: output.display().to_string(),
        input_count: inputs.len(),
        page_count,
        warnings: assembly.warnings,
    })
}

pub fn run(inputs: &[PathBuf], pages: &[String], output: &Path, mode: ParseMode) -> Result<()> {
    let report = execute(inputs, pages, output, mode)?;

    println!(
        "Combined {} page(s) from {} file(s) into {}",
        report.page_count, report.input_count, report.output_path
    );

    Ok(())
}
