//! docshard-ingest - Document extraction and chunking pipeline.
//!
//! This crate provides:
//! - Content sniffing for ambiguous files ([`detect`])
//! - Format processors for PDF, Office, RTF, MHT, plain text, and Word
//! - A processor registry dispatching exactly one processor per file
//! - The recursive per-format text splitter
//!
//! The pipeline is synchronous and processes one file per call; the
//! caller owns scheduling and retries.

pub mod detect;
mod error;
pub mod processors;
mod registry;
mod splitter;

pub use error::{IngestError, IngestResult};
pub use processors::{FormatProcessor, ProcessOptions};
pub use registry::ProcessorRegistry;
pub use splitter::{separators_for, TextSplitter, SPLITTING_METHOD};
