// src/extractors/mod.rs
pub mod blocks;
pub mod links;
pub mod record;

// Re-export key extraction types for convenience
pub use blocks::BlockCollector;
pub use links::{anchors_in, resolve_branch_link};
pub use record::{parse_branch_block, BranchRecord};
