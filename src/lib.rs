//! Page-level PDF tools: combine selected pages of several documents, split
//! one document into groups of pages, and rotate every page.
//!
//! Page selections are written in a small range language ("1, 3-5, 8", with
//! `;` separating output groups) and parsed by [`page_range`]. [`assemble`]
//! turns parsed selections into ordered page sequences and [`output`] writes
//! them out through the lopdf-backed [`pdf`] adapter.

pub mod assemble;
pub mod commands;
pub mod error;
pub mod mcp;
pub mod output;
pub mod page_range;
pub mod pdf;

pub use error::{PageError, Result};
