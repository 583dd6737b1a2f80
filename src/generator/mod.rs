//! MXL generator – turn a [`Score`](crate::model::Score) into a MusicXML archive.
//!
//! This module provides:
//! - [`xml`] – The in-memory element tree and its text serialization.
//! - [`document`] – Build the `score-partwise` tree from a score.
//! - [`archive`] – Package the tree as `score.xml` plus container into an MXL zip.

pub mod archive;
pub mod document;
pub mod xml;

pub use archive::{MXL_MEDIA_TYPE, pack, render_score_xml, write_mxl_file, write_xml_file};
pub use document::DocumentBuilder;
pub use xml::Element;
