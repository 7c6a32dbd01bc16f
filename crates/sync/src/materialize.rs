//! Grouping and file output for the content sync.
//!
//! Output must be byte-identical across runs over unchanged data: records
//! arrive in the defined `(page, key)` order, groups are BTreeMaps, and
//! documents render with stable key order and tab indentation, so the
//! generated files diff cleanly in the site repository.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use copydesk_core::document::Document;
use copydesk_core::record::{ContentKind, ContentRecord};

/// Group a table snapshot by locale, then page.
pub fn group_records(
    records: &[ContentRecord],
) -> BTreeMap<&str, BTreeMap<&str, Vec<&ContentRecord>>> {
    let mut grouped: BTreeMap<&str, BTreeMap<&str, Vec<&ContentRecord>>> = BTreeMap::new();
    for record in records {
        grouped
            .entry(record.locale.as_str())
            .or_default()
            .entry(record.page.as_str())
            .or_default()
            .push(record);
    }
    grouped
}

/// Serialize a document the way the site build expects it: UTF-8,
/// tab-indented, trailing newline.
pub fn render_document(document: &Document) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    document.to_json().serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(String::from_utf8(buf).expect("serde_json output is UTF-8"))
}

/// Write one JSON file per `(locale, page)` group under `content_dir`.
/// Returns the number of files written. Every group is nested and
/// rendered before the first file is written, so a malformed key anywhere
/// in the snapshot aborts the run with nothing on disk; stored rows are
/// supposed to be valid and a bad one should be fixed, not papered over.
pub fn write_documents(
    records: &[ContentRecord],
    content_dir: &Path,
    download_assets: bool,
) -> anyhow::Result<usize> {
    let mut rendered = Vec::new();

    for (locale, pages) in group_records(records) {
        for (page, group) in pages {
            if download_assets {
                note_image_assets(&group);
            }

            let document = Document::from_records(
                group.iter().map(|r| (r.key.as_str(), r.value.as_str())),
            )
            .with_context(|| format!("nesting records for {locale}/{page}"))?;

            let output = render_document(&document)
                .with_context(|| format!("serializing {locale}/{page}"))?;
            rendered.push((locale, page, output));
        }
    }

    let count = rendered.len();
    for (locale, page, output) in rendered {
        let locale_dir = content_dir.join(locale);
        fs::create_dir_all(&locale_dir)
            .with_context(|| format!("creating {}", locale_dir.display()))?;
        let path = locale_dir.join(format!("{page}.json"));
        fs::write(&path, output).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("Written: {}/{}/{}.json", content_dir.display(), locale, page);
    }

    Ok(count)
}

// TODO: download image assets into public/cms/ and rewrite their URLs to
// local paths; for now the remote URL is written through unchanged.
fn note_image_assets(group: &[&ContentRecord]) {
    for record in group {
        if record.kind == ContentKind::Image && record.value.starts_with("http") {
            tracing::debug!(key = %record.key, url = %record.value, "image asset kept as remote URL");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copydesk_core::record::ContentKind;
    use serde_json::{json, Value};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn record(page: &str, locale: &str, key: &str, value: &str) -> ContentRecord {
        ContentRecord::new(page, locale, key, value, ContentKind::Text)
    }

    fn temp_content_dir() -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let dir = std::env::temp_dir().join(format!(
            "copydesk-sync-test-{}-{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn groups_by_locale_then_page() {
        let records = vec![
            record("home", "es", "hero.title", "X"),
            record("contacto", "es", "form.title", "Y"),
            record("home", "en", "hero.title", "Z"),
        ];
        let grouped = group_records(&records);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["es"].len(), 2);
        assert_eq!(grouped["es"]["home"].len(), 1);
        assert_eq!(grouped["en"]["home"][0].value, "Z");
    }

    #[test]
    fn renders_tab_indented_with_trailing_newline() {
        let document =
            Document::from_records([("hero.title", "X"), ("hero.button1Text", "Y")]).unwrap();
        let rendered = render_document(&document).unwrap();
        assert_eq!(
            rendered,
            "{\n\t\"hero\": {\n\t\t\"button1Text\": \"Y\",\n\t\t\"title\": \"X\"\n\t}\n}\n"
        );
    }

    #[test]
    fn writes_one_file_per_locale_page_pair() {
        let dir = temp_content_dir();
        let records = vec![
            record("home", "es", "hero.title", "X"),
            record("home", "es", "hero.button1Text", "Y"),
        ];

        let written = write_documents(&records, &dir, false).unwrap();
        assert_eq!(written, 1);

        let content = fs::read_to_string(dir.join("es/home.json")).unwrap();
        let parsed: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(
            parsed,
            json!({"hero": {"title": "X", "button1Text": "Y"}})
        );
    }

    #[test]
    fn empty_snapshot_writes_nothing_and_succeeds() {
        let dir = temp_content_dir();
        let written = write_documents(&[], &dir, false).unwrap();
        assert_eq!(written, 0);
        assert!(fs::read_dir(&dir).unwrap().next().is_none());
    }

    #[test]
    fn reruns_are_byte_identical() {
        let dir = temp_content_dir();
        let records = vec![
            record("home", "es", "hero.title", "X"),
            record("home", "es", "services.items", r#"[{"label":"Fiscal"}]"#),
        ];

        write_documents(&records, &dir, false).unwrap();
        let first = fs::read(dir.join("es/home.json")).unwrap();
        write_documents(&records, &dir, false).unwrap();
        let second = fs::read(dir.join("es/home.json")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn malformed_key_aborts_before_anything_is_written() {
        let dir = temp_content_dir();
        let records = vec![
            record("contacto", "es", "form.title", "ok"),
            record("home", "es", "hero..title", "X"),
        ];
        assert!(write_documents(&records, &dir, false).is_err());
        assert!(fs::read_dir(&dir).unwrap().next().is_none());
    }
}
