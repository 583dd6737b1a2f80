//! SimpleNote to MusicXML converter.
//!
//! This crate turns a simplified score description (title, artist, measures of
//! notes and rests) into a MusicXML 3.1 document packaged as an `.mxl` archive
//! that MuseScore imports with the intended page layout.
//!
//! The binary `simplenote-mxl` converts JSON score requests in batch.

pub mod error;
pub mod generator;
pub mod model;
pub mod profile;

use anyhow::Result;
use generator::DocumentBuilder;
use model::Score;
use profile::CompatProfile;

/// Build and pack `score` in one step, stamping today's date.
pub fn generate_mxl(score: &Score, profile: &CompatProfile) -> Result<Vec<u8>> {
    let tree = DocumentBuilder::new(profile).build(score);
    generator::pack(&tree)
}
