use crate::pdf::SourceDocument;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct InfoReport {
    pub path: String,
    pub version: String,
    pub page_count: u32,
    pub title: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
}

pub fn execute<P: AsRef<Path>>(path: P) -> Result<InfoReport> {
    let path = path.as_ref();
    let doc = SourceDocument::open(path)
        .with_context(|| format!("Failed to load PDF: {}", path.display()))?;
    let info = doc.get_info();

    Ok(InfoReport {
        path: path.display().to_string(),
        version: info.version,
        page_count: info.page_count,
        title: info.title,
        author: info.author,
        creator: info.creator,
        producer: info.producer,
    })
}

pub fn run<P: AsRef<Path>>(path: P) -> Result<()> {
    let info = execute(path)?;

    println!("File: {}", info.path);
    println!("PDF version: {}", info.version);
    println!("Pages: {}", info.page_count);

    if let Some(title) = &info.title {
        println!("Title: {}", title);
    }
    if let Some(author) = &info.author {
        println!("Author: {}", author);
    }
    if let Some(creator) = &info.creator {
        println!("Creator: {}", creator);
    }
    if let Some(producer) = &info.producer {
        println!("Producer: {}", producer);
    }

    Ok(())
}
