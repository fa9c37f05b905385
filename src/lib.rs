//! Builds a `maplist.txt` of `title:id` lines from a Steam Workshop collection.
//!
//! The pipeline runs strictly in order: the collection is expanded to its
//! member ids with one request, member details are fetched in batches of
//! [`domain::BATCH_SIZE`] with a pause between requests, and the titled
//! records are sorted into the manifest.

pub mod app;
pub mod domain;
pub mod error;
pub mod manifest;
pub mod output;
pub mod settings;
pub mod steam;
