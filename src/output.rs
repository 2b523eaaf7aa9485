//! Realizes assembled page sequences as PDF bytes and packs them for delivery.

use crate::assemble::AssembledOutput;
use crate::error::{PageError, Result};
use crate::pdf::OutputDocument;
use log::info;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A finished output document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedOutput {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Serialize every assembled output, in order.
///
/// Fails with [`PageError::NothingProduced`] when there is nothing to build.
pub fn build(outputs: &[AssembledOutput<'_>]) -> Result<Vec<NamedOutput>> {
    if outputs.is_empty() {
        return Err(PageError::NothingProduced);
    }

    outputs
        .iter()
        .map(|output| {
            let mut doc = OutputDocument::new();
            for &page in &output.pages {
                doc.append(page)?;
            }
            let bytes = doc.serialize()?;
            info!(
                "Built {} ({} page(s), {} bytes)",
                output.name,
                output.pages.len(),
                bytes.len()
            );
            Ok(NamedOutput {
                name: output.name.clone(),
                bytes,
            })
        })
        .collect()
}

/// Pack outputs into one flat, deflate-compressed zip archive.
pub fn archive(outputs: &[NamedOutput]) -> Result<Vec<u8>> {
    if outputs.is_empty() {
        return Err(PageError::NothingProduced);
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for output in outputs {
        zip.start_file(output.name.as_str(), options)?;
        zip.write_all(&output.bytes)?;
    }

    Ok(zip.finish()?.into_inner())
}
