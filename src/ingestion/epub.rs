//! EPUB chapter extraction
//!
//! An EPUB is a zip archive of XHTML chapters plus an OPF package manifest.
//! Chapters are read in spine order when the package document can be located
//! via `META-INF/container.xml`; otherwise every XHTML entry is read in name
//! order.

use std::io::{Cursor, Read};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::types::Document;

/// Read an EPUB file into one `Document` per non-empty chapter.
pub fn read_epub(path: &Path) -> Result<Vec<Document>> {
    let data = std::fs::read(path)?;
    let source_id = path.to_string_lossy().to_string();
    read_epub_bytes(&source_id, &data)
}

/// Read EPUB data into one `Document` per non-empty chapter.
pub fn read_epub_bytes(source_id: &str, data: &[u8]) -> Result<Vec<Document>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| Error::parse(source_id, format!("not a zip archive: {}", e)))?;

    let chapter_names = match spine_order(&mut archive) {
        Some(names) if !names.is_empty() => names,
        _ => xhtml_entries(&archive),
    };

    let mut documents = Vec::new();
    for name in chapter_names {
        let Ok(mut entry) = archive.by_name(&name) else {
            continue;
        };
        let mut html = String::new();
        if entry.read_to_string(&mut html).is_err() {
            continue;
        }
        let text = html_to_text(&html);
        if let Some(doc) = Document::new(format!("{}#{}", source_id, name), &text) {
            documents.push(doc);
        }
    }

    if documents.is_empty() {
        return Err(Error::parse(source_id, "no readable chapters"));
    }

    Ok(documents)
}

/// Extract visible text from an XHTML chapter.
fn html_to_text(html: &str) -> String {
    let fragment = scraper::Html::parse_document(html);
    let body_selector = scraper::Selector::parse("body").expect("static selector");

    let mut text = String::new();
    let root: Box<dyn Iterator<Item = &str>> =
        if let Some(body) = fragment.select(&body_selector).next() {
            Box::new(body.text())
        } else {
            Box::new(fragment.root_element().text())
        };

    for piece in root {
        let trimmed = piece.trim();
        if !trimmed.is_empty() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(trimmed);
        }
    }
    text
}

/// Resolve the chapter list in spine order from the OPF package document.
fn spine_order<R: Read + std::io::Seek>(archive: &mut zip::ZipArchive<R>) -> Option<Vec<String>> {
    let container = read_entry(archive, "META-INF/container.xml")?;
    let opf_path = container_rootfile(&container)?;
    let opf = read_entry(archive, &opf_path)?;

    // Manifest hrefs are relative to the OPF's directory.
    let opf_dir = match opf_path.rfind('/') {
        Some(idx) => &opf_path[..=idx],
        None => "",
    };

    let (manifest, spine) = parse_opf(&opf)?;
    let chapters = spine
        .iter()
        .filter_map(|idref| manifest.iter().find(|(id, _)| id == idref))
        .map(|(_, href)| format!("{}{}", opf_dir, href))
        .collect();
    Some(chapters)
}

fn read_entry<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> Option<String> {
    let mut entry = archive.by_name(name).ok()?;
    let mut content = String::new();
    entry.read_to_string(&mut content).ok()?;
    Some(content)
}

/// Pull the `full-path` attribute of the first `rootfile` element.
fn container_rootfile(container_xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(container_xml);
    loop {
        match reader.read_event().ok()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"rootfile" => {
                let attr = e.try_get_attribute("full-path").ok()??;
                return Some(String::from_utf8_lossy(&attr.value).into_owned());
            }
            Event::Eof => return None,
            _ => {}
        }
    }
}

/// Parse the OPF into (manifest item id -> href) pairs and spine idrefs.
fn parse_opf(opf_xml: &str) -> Option<(Vec<(String, String)>, Vec<String>)> {
    let mut reader = Reader::from_str(opf_xml);
    let mut manifest = Vec::new();
    let mut spine = Vec::new();

    loop {
        match reader.read_event().ok()? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"item" => {
                    let id = e
                        .try_get_attribute("id")
                        .ok()
                        .flatten()
                        .map(|a| String::from_utf8_lossy(&a.value).into_owned());
                    let href = e
                        .try_get_attribute("href")
                        .ok()
                        .flatten()
                        .map(|a| String::from_utf8_lossy(&a.value).into_owned());
                    if let (Some(id), Some(href)) = (id, href) {
                        manifest.push((id, href));
                    }
                }
                b"itemref" => {
                    if let Ok(Some(attr)) = e.try_get_attribute("idref") {
                        spine.push(String::from_utf8_lossy(&attr.value).into_owned());
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Some((manifest, spine))
}

/// All XHTML entries in name order, for archives without a usable OPF.
fn xhtml_entries<R: Read + std::io::Seek>(archive: &zip::ZipArchive<R>) -> Vec<String> {
    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| {
            let lower = name.to_lowercase();
            lower.ends_with(".xhtml") || lower.ends_with(".html") || lower.ends_with(".htm")
        })
        .map(|s| s.to_string())
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    /// Build a minimal two-chapter EPUB in memory, spine in reverse of
    /// lexicographic entry order so spine handling is observable.
    fn sample_epub() -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buf);
            let opts = SimpleFileOptions::default();

            zip.start_file("META-INF/container.xml", opts).unwrap();
            zip.write_all(
                br#"<?xml version="1.0"?>
<container xmlns="urn:oasis:names:tc:opendocument:xmlns:container" version="1.0">
  <rootfiles><rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/></rootfiles>
</container>"#,
            )
            .unwrap();

            zip.start_file("OEBPS/content.opf", opts).unwrap();
            zip.write_all(
                br#"<?xml version="1.0"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0">
  <manifest>
    <item id="c1" href="a_second.xhtml" media-type="application/xhtml+xml"/>
    <item id="c2" href="b_first.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine><itemref idref="c2"/><itemref idref="c1"/></spine>
</package>"#,
            )
            .unwrap();

            zip.start_file("OEBPS/a_second.xhtml", opts).unwrap();
            zip.write_all(b"<html><body><p>Second chapter.</p></body></html>")
                .unwrap();
            zip.start_file("OEBPS/b_first.xhtml", opts).unwrap();
            zip.write_all(b"<html><body><h1>One</h1><p>First\nchapter.</p></body></html>")
                .unwrap();
            zip.finish().unwrap();
        }
        buf.into_inner()
    }

    #[test]
    fn chapters_follow_spine_order() {
        let docs = read_epub_bytes("book.epub", &sample_epub()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].source, "book.epub#OEBPS/b_first.xhtml");
        assert_eq!(docs[0].text, "One First chapter.");
        assert_eq!(docs[1].text, "Second chapter.");
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = read_epub_bytes("bad.epub", b"not a zip").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }
}
