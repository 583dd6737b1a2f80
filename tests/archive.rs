use anyhow::Result;
use camino::Utf8PathBuf;
use simplenote_mxl::generator::archive::{
    CONTAINER_ENTRY, CONTAINER_XML, PARTWISE_DOCTYPE, SCORE_ENTRY, XML_DECLARATION,
};
use simplenote_mxl::generator::{DocumentBuilder, Element, pack, write_mxl_file, write_xml_file};
use simplenote_mxl::model::{Measure, Note, Score};
use simplenote_mxl::profile::CompatProfile;
use std::io::{Cursor, Read};

fn sample_tree() -> Element {
    let score = Score::new(
        "Packed",
        vec![Measure::new(vec![
            Note::pitched("A", 4, 2),
            Note::rest(2),
        ])],
    );
    DocumentBuilder::new(&CompatProfile::default()).build(&score)
}

fn read_entries(bytes: &[u8]) -> Result<Vec<(String, zip::CompressionMethod, String)>> {
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut entries = Vec::new();
    for i in 0..zip.len() {
        let mut file = zip.by_index(i)?;
        let mut text = String::new();
        file.read_to_string(&mut text)?;
        entries.push((file.name().to_string(), file.compression(), text));
    }
    Ok(entries)
}

#[test]
fn archive_holds_exactly_score_and_container() -> Result<()> {
    let bytes = pack(&sample_tree())?;
    let entries = read_entries(&bytes)?;
    let names: Vec<_> = entries.iter().map(|(n, _, _)| n.as_str()).collect();
    assert_eq!(names, vec![SCORE_ENTRY, CONTAINER_ENTRY]);
    for (_, method, _) in &entries {
        assert_eq!(*method, zip::CompressionMethod::Deflated);
    }
    Ok(())
}

#[test]
fn score_entry_starts_with_declaration_and_doctype() -> Result<()> {
    let bytes = pack(&sample_tree())?;
    let entries = read_entries(&bytes)?;
    let score = &entries[0].2;
    let prologue = format!("{}\n{}\n<score-partwise version=\"3.1\">", XML_DECLARATION, PARTWISE_DOCTYPE);
    assert!(score.starts_with(&prologue));
    assert!(score.starts_with(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE score-partwise PUBLIC \"-//Recordare//DTD MusicXML 3.1 Partwise//EN\" \"http://www.musicxml.org/dtds/partwise.dtd\">"
    ));
    Ok(())
}

#[test]
fn container_entry_is_fixed() -> Result<()> {
    let bytes = pack(&sample_tree())?;
    let entries = read_entries(&bytes)?;
    assert_eq!(entries[1].2, CONTAINER_XML);
    Ok(())
}

#[test]
fn write_mxl_file_leaves_only_the_archive() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let scratch = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    let dest = scratch.join("song.mxl");

    write_mxl_file(&sample_tree(), &scratch, &dest)?;

    let files: Vec<_> = std::fs::read_dir(&scratch)?
        .map(|e| e.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<std::io::Result<_>>()?;
    assert_eq!(files, vec!["song.mxl".to_string()]);
    let entries = read_entries(&std::fs::read(&dest)?)?;
    assert_eq!(entries.len(), 2);
    Ok(())
}

#[test]
fn write_mxl_file_fails_cleanly_for_missing_destination_dir() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let scratch = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    let dest = scratch.join("missing").join("song.mxl");

    assert!(write_mxl_file(&sample_tree(), &scratch, &dest).is_err());
    assert_eq!(std::fs::read_dir(&scratch)?.count(), 0);
    Ok(())
}

#[test]
fn write_xml_file_writes_plain_score() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let scratch = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    let dest = scratch.join("song.musicxml");

    write_xml_file(&sample_tree(), &scratch, &dest)?;

    let text = std::fs::read_to_string(&dest)?;
    assert!(text.starts_with(XML_DECLARATION));
    assert!(text.contains("<step>A</step>"));
    assert_eq!(std::fs::read_dir(&scratch)?.count(), 1);
    Ok(())
}

#[test]
fn concurrent_packing_is_independent() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let scratch = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    let tree = sample_tree();

    std::thread::scope(|s| -> Result<()> {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let dest = scratch.join(format!("song-{}.mxl", i));
                let (tree, scratch) = (&tree, &scratch);
                s.spawn(move || write_mxl_file(tree, scratch, &dest))
            })
            .collect();
        for h in handles {
            h.join().expect("packing thread panicked")?;
        }
        Ok(())
    })?;

    assert_eq!(std::fs::read_dir(&scratch)?.count(), 8);
    let first = std::fs::read(scratch.join("song-0.mxl"))?;
    assert_eq!(read_entries(&first)?.len(), 2);
    Ok(())
}
