// src/feed/mod.rs
//! HTTP and file collaborators: site lists, page loads, places search and the sheet upload.

pub mod client;
pub mod models;
pub mod places;

pub use client::{build_client, fetch_page, load_sites_from_file, load_sites_from_sheet, post_results};
pub use models::{Site, UploadOutcome};
pub use places::PlacesClient;
