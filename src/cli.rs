use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfpages")]
#[command(about = "Combine, split and rotate PDF pages, with MCP server support")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server
    Mcp,

    /// Display page count and PDF metadata
    Info {
        /// PDF file to inspect
        path: PathBuf,
    },

    /// Combine selected pages of several PDFs into one, in input order
    #[command(visible_alias = "extract", alias = "cat")]
    Combine {
        /// PDF files to take pages from
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Pages for the input at the same position (e.g., "1, 3-5, 8");
        /// omitted or empty means all pages
        #[arg(short, long = "pages")]
        pages: Vec<String>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Fail on malformed or out-of-range page numbers instead of skipping them
        #[arg(long)]
        strict: bool,
    },

    /// Split a PDF into several files by page groups
    #[command(alias = "burst")]
    Split {
        /// PDF file to split
        path: PathBuf,

        /// Groups separated by ';' (e.g., "1-5; 6-10; 1, 12");
        /// empty splits into single pages
        #[arg(short, long, default_value = "")]
        ranges: String,

        /// Write all outputs into this zip archive
        #[arg(short, long, conflicts_with = "output_dir", required_unless_present = "output_dir")]
        archive: Option<PathBuf>,

        /// Write the outputs as individual files into this directory
        #[arg(short = 'd', long)]
        output_dir: Option<PathBuf>,

        /// Prefix of the output file names (default: input file stem)
        #[arg(short, long)]
        base_name: Option<String>,

        /// Fail on malformed or out-of-range page numbers instead of skipping them
        #[arg(long)]
        strict: bool,
    },

    /// Rotate every page of a PDF
    Rotate {
        /// PDF file to rotate
        path: PathBuf,

        /// Clockwise angle, a multiple of 90 (e.g., 90, -90, 180)
        #[arg(short, long, allow_negative_numbers = true)]
        angle: i64,

        /// Output file (default: rotated_<name> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
