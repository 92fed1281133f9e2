//! docshard-store - Vector persistence.
//!
//! Fragments are embedded through a vendor client and written either to
//! an embedded SQLite store or to a remote vector store server. Each
//! embedding vendor carries its own default collection name and
//! persistence directory, so switching vendors never mixes vectors of
//! different dimensionality.

mod embedded;
mod error;
mod gateway;
mod remote;

pub use embedded::EmbeddedStore;
pub use error::{StoreError, StoreResult};
pub use gateway::{
    StoreHandle, StoreMode, StoreOptions, VectorStoreGateway, DEFAULT_REMOTE_PORT,
};
pub use remote::RemoteStore;
