use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::commands;
use crate::commands::split::{SplitOptions, SplitTarget};
use crate::page_range::ParseMode;

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfCombineRequest {
    #[schemars(description = "PDF files to take pages from, in output order")]
    pub inputs: Vec<String>,
    #[schemars(
        description = "Page specification per input, by position (e.g., '1, 3-5, 8'). Missing or empty means all pages"
    )]
    #[serde(default)]
    pub pages: Vec<String>,
    #[schemars(description = "Output file path")]
    pub output: String,
    #[schemars(description = "Reject malformed or out-of-range pages instead of skipping them (default: false)")]
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfSplitRequest {
    #[schemars(description = "Path to the PDF file to split")]
    pub path: String,
    #[schemars(
        description = "Page groups separated by ';' (e.g., '1-5; 6-10'). Empty splits into single pages"
    )]
    #[serde(default)]
    pub ranges: String,
    #[schemars(description = "Zip archive to write all outputs into")]
    pub archive: Option<String>,
    #[schemars(description = "Directory to write the outputs into (used when no archive is given)")]
    pub output_dir: Option<String>,
    #[schemars(description = "Prefix of the output file names (default: input file stem)")]
    pub base_name: Option<String>,
    #[schemars(description = "Reject malformed or out-of-range pages instead of skipping them (default: false)")]
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfRotateRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Clockwise angle, a multiple of 90 (e.g., 90, -90, 180)")]
    pub degrees: i64,
    #[schemars(description = "Output file path (default: rotated_<name> next to the input)")]
    pub output: Option<String>,
}

fn to_json<T: Serialize>(result: Result<T>) -> String {
    match result {
        Ok(value) => {
            serde_json::to_string_pretty(&value).unwrap_or_else(|e| format!("Error: {}", e))
        }
        Err(e) => format!("Error: {:#}", e),
    }
}

#[derive(Debug, Clone)]
pub struct PdfServer {
    tool_router: ToolRouter<Self>,
}

impl PdfServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for PdfServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl PdfServer {
    #[tool(description = "Get the page count, PDF version and metadata of a PDF")]
    fn pdf_info(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        to_json(commands::info::execute(&path))
    }

    #[tool(
        description = "Combine selected pages of several PDFs into one new PDF, in input order. Pages are given per input like '1, 3-5, 8'"
    )]
    fn pdf_combine(&self, Parameters(req): Parameters<PdfCombineRequest>) -> String {
        to_json(commands::combine::execute(
            &req.inputs,
            &req.pages,
            Path::new(&req.output),
            ParseMode::from_strict(req.strict),
        ))
    }

    #[tool(
        description = "Split a PDF into several PDFs by ';'-separated page groups, into a zip archive or a directory"
    )]
    fn pdf_split(&self, Parameters(req): Parameters<PdfSplitRequest>) -> String {
        let target = match (req.archive, req.output_dir) {
            (Some(archive), _) => SplitTarget::Archive(PathBuf::from(archive)),
            (None, Some(dir)) => SplitTarget::Directory(PathBuf::from(dir)),
            (None, None) => return "Error: either archive or output_dir is required".to_string(),
        };
        let options = SplitOptions {
            ranges: req.ranges,
            base_name: req.base_name,
            mode: ParseMode::from_strict(req.strict),
        };
        to_json(commands::split::execute(&req.path, &options, &target))
    }

    #[tool(description = "Rotate every page of a PDF by a multiple of 90 degrees and save it")]
    fn pdf_rotate(&self, Parameters(req): Parameters<PdfRotateRequest>) -> String {
        to_json(commands::rotate::execute(
            &req.path,
            req.degrees,
            req.output.as_deref().map(Path::new),
        ))
    }
}

#[tool_handler]
impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Page-level PDF tools. Use pdf_info to get the page count, pdf_combine to merge \
                 selected pages of several PDFs, pdf_split to split one PDF by page groups, and \
                 pdf_rotate to rotate every page."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    let server = PdfServer::new();

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
