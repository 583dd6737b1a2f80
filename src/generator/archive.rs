//! MXL packaging.
//!
//! An MXL file is a ZIP archive holding the score document (`score.xml`) and
//! an OASIS container descriptor (`META-INF/container.xml`) that points at it.
//! Both entries are deflate-compressed.

use crate::generator::xml::Element;
use anyhow::{Context, Result};
use camino::Utf8Path;
use log::debug;
use std::io::{Cursor, Seek, Write};

pub const SCORE_ENTRY: &str = "score.xml";
pub const CONTAINER_ENTRY: &str = "META-INF/container.xml";

/// MIME type of a compressed MusicXML archive.
pub const MXL_MEDIA_TYPE: &str = "application/vnd.recordare.musicxml+zip";
/// MIME type of an uncompressed MusicXML document.
pub const MUSICXML_MEDIA_TYPE: &str = "application/vnd.recordare.musicxml+xml";

pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";
pub const PARTWISE_DOCTYPE: &str = "<!DOCTYPE score-partwise PUBLIC \"-//Recordare//DTD MusicXML 3.1 Partwise//EN\" \"http://www.musicxml.org/dtds/partwise.dtd\">";

pub const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="score.xml" media-type="application/vnd.recordare.musicxml+xml"/>
  </rootfiles>
</container>"#;

/// Full text of `score.xml`: declaration, DOCTYPE, then the document.
pub fn render_score_xml(tree: &Element) -> String {
    let body = tree.to_xml();
    let prologue_len = XML_DECLARATION.len() + PARTWISE_DOCTYPE.len() + 2;
    let mut out = String::with_capacity(prologue_len + body.len());
    out.push_str(XML_DECLARATION);
    out.push('\n');
    out.push_str(PARTWISE_DOCTYPE);
    out.push('\n');
    out.push_str(&body);
    out
}

/// Write the MXL archive for `tree` to a writer.
pub fn write_mxl<W: Write + Seek>(tree: &Element, writer: W) -> Result<W> {
    let mut zip = zip::ZipWriter::new(writer);
    let options = zip::write::FileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    let score = render_score_xml(tree);
    zip.start_file(SCORE_ENTRY, options)
        .with_context(|| format!("Failed to start {}", SCORE_ENTRY))?;
    zip.write_all(score.as_bytes())
        .with_context(|| format!("Failed to write {}", SCORE_ENTRY))?;

    zip.start_file(CONTAINER_ENTRY, options)
        .with_context(|| format!("Failed to start {}", CONTAINER_ENTRY))?;
    zip.write_all(CONTAINER_XML.as_bytes())
        .with_context(|| format!("Failed to write {}", CONTAINER_ENTRY))?;

    let writer = zip.finish().context("Failed to finish MXL archive")?;
    debug!("Packed MXL archive ({} bytes of score text)", score.len());
    Ok(writer)
}

/// Pack `tree` into an in-memory MXL archive.
pub fn pack(tree: &Element) -> Result<Vec<u8>> {
    let cursor = write_mxl(tree, Cursor::new(Vec::new()))?;
    Ok(cursor.into_inner())
}

/// Write the MXL archive to `dest` through a uniquely named temporary file in
/// `scratch_dir`.
///
/// `dest` only ever sees a complete archive; on failure the temporary file is
/// removed and `dest` is left untouched. `scratch_dir` should be on the same
/// filesystem as `dest` so the final rename is atomic.
pub fn write_mxl_file(tree: &Element, scratch_dir: &Utf8Path, dest: &Utf8Path) -> Result<()> {
    let tmp = tempfile::Builder::new()
        .prefix(".mxl-")
        .suffix(".tmp")
        .tempfile_in(scratch_dir)
        .with_context(|| format!("Failed to create temporary file in {}", scratch_dir))?;
    let mut file = write_mxl(tree, tmp)?;
    file.as_file_mut()
        .sync_all()
        .with_context(|| format!("Failed to flush archive for {}", dest))?;
    file.persist(dest)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to move archive to {}", dest))?;
    Ok(())
}

/// Write the uncompressed `score.xml` text to `dest`, with the same
/// temporary-file guarantees as [`write_mxl_file`].
pub fn write_xml_file(tree: &Element, scratch_dir: &Utf8Path, dest: &Utf8Path) -> Result<()> {
    let mut tmp = tempfile::Builder::new()
        .prefix(".musicxml-")
        .suffix(".tmp")
        .tempfile_in(scratch_dir)
        .with_context(|| format!("Failed to create temporary file in {}", scratch_dir))?;
    tmp.write_all(render_score_xml(tree).as_bytes())
        .with_context(|| format!("Failed to write score text for {}", dest))?;
    tmp.persist(dest)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to move score to {}", dest))?;
    Ok(())
}
