pub mod document;
pub mod page;
pub mod writer;

pub use document::SourceDocument;
pub use page::{PageRef, Rotation};
pub use writer::OutputDocument;
