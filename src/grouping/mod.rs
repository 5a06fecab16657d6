// src/grouping/mod.rs
//! Grouping and classification of places returned by the places-search feed.

pub mod classify;
pub mod group;

pub use classify::ClassifiedRecord;
pub use group::{group_places, GroupedRecord, Place};
