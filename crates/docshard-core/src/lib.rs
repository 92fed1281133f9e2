//! Core domain types for docshard.
//!
//! This crate defines the shapes shared by every stage of the pipeline:
//! - [`Fragment`]: the atomic unit handed to the vector store
//! - [`MetaValue`]: the scalar-only metadata value set the store can index
//! - [`DocumentFormat`] and [`ContentHint`]: format classification
//! - [`ChunkGeometry`]: the single source of truth for per-format chunking

mod chunk;
mod format;
mod fragment;
mod meta;

pub use chunk::ChunkGeometry;
pub use format::{ContentHint, DocumentFormat};
pub use fragment::{sanitize_metadata, Fragment, FragmentEnvelope};
pub use meta::MetaValue;
