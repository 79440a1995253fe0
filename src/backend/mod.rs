//! Persistence backends for rowquery
//!
//! A backend is a flat namespace of slash-separated paths holding byte blobs,
//! with just enough directory semantics to enumerate and remove a subtree.
//! Tables never touch the filesystem directly; they go through this trait.
//!
//! - `LocalBackend`: paths map onto files below a root directory
//! - `MemoryBackend`: paths live in an in-process map (tests, scratch tables)

mod backend;
mod errors;
mod local;
mod memory;

pub use backend::StorageBackend;
pub use errors::{BackendError, BackendResult};
pub use local::LocalBackend;
pub use memory::MemoryBackend;
