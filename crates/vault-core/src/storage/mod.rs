//! Salt storage backends
//!
//! This module provides two `SaltStore` backends:
//! 1. In-memory (tests, single-process sessions)
//! 2. JSON file in the user's data directory

mod file;
mod memory;
mod traits;

pub use file::{default_data_dir, FileSaltStore};
pub use memory::MemorySaltStore;
pub use traits::SaltStore;
