use std::io::Write;
use std::sync::Arc;

use flate2::Compression;
use flate2::Crc;
use flate2::write::DeflateEncoder;
use tempfile::TempDir;

use ziptree::{
    BrowseSession, LocalFileReader, Materialized, MemoryReader, OverwritePolicy, ZipArchive,
};

/// Minimal ZIP writer: local headers, central directory and EOCD.
/// Names ending in `/` become directory entries.
fn build_zip(entries: &[(&str, &str, bool)]) -> Vec<u8> {
    build_zip_declaring(entries, None)
}

/// Like [`build_zip`], but every central directory header claims the given
/// `(uncompressed, compressed)` sizes through a ZIP64 extra field. A `None`
/// compressed size keeps the real one.
fn build_zip_declaring(
    entries: &[(&str, &str, bool)],
    declared: Option<(u64, Option<u64>)>,
) -> Vec<u8> {
    let mut out = Vec::new();
    let mut central = Vec::new();

    for (name, text, deflate) in entries {
        let data = text.as_bytes();
        let mut crc = Crc::new();
        crc.update(data);
        let payload = if *deflate {
            let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data).unwrap();
            encoder.finish().unwrap()
        } else {
            data.to_vec()
        };
        let method: u16 = if *deflate { 8 } else { 0 };
        let offset = out.len() as u32;

        out.extend_from_slice(b"PK\x03\x04");
        out.extend_from_slice(&20u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&method.to_le_bytes());
        out.extend_from_slice(&0x6000u16.to_le_bytes());
        out.extend_from_slice(&0x5921u16.to_le_bytes());
        out.extend_from_slice(&crc.sum().to_le_bytes());
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(&payload);

        central.extend_from_slice(b"PK\x01\x02");
        central.extend_from_slice(&20u16.to_le_bytes());
        central.extend_from_slice(&20u16.to_le_bytes());
        central.extend_from_slice(&0u16.to_le_bytes());
        central.extend_from_slice(&method.to_le_bytes());
        central.extend_from_slice(&0x6000u16.to_le_bytes());
        central.extend_from_slice(&0x5921u16.to_le_bytes());
        let mut compressed_field = payload.len() as u32;
        let mut uncompressed_field = data.len() as u32;
        let mut extra = Vec::new();
        if let Some((uncompressed, compressed)) = declared {
            let mut values = vec![uncompressed];
            uncompressed_field = 0xFFFF_FFFF;
            if let Some(compressed) = compressed {
                values.push(compressed);
                compressed_field = 0xFFFF_FFFF;
            }
            extra.extend_from_slice(&1u16.to_le_bytes());
            extra.extend_from_slice(&((values.len() * 8) as u16).to_le_bytes());
            for value in values {
                extra.extend_from_slice(&value.to_le_bytes());
            }
        }

        central.extend_from_slice(&crc.sum().to_le_bytes());
        central.extend_from_slice(&compressed_field.to_le_bytes());
        central.extend_from_slice(&uncompressed_field.to_le_bytes());
        central.extend_from_slice(&(name.len() as u16).to_le_bytes());
        central.extend_from_slice(&(extra.len() as u16).to_le_bytes());
        central.extend_from_slice(&0u16.to_le_bytes());
        central.extend_from_slice(&0u16.to_le_bytes());
        central.extend_from_slice(&0u16.to_le_bytes());
        central.extend_from_slice(&0u32.to_le_bytes());
        central.extend_from_slice(&offset.to_le_bytes());
        central.extend_from_slice(name.as_bytes());
        central.extend_from_slice(&extra);
    }

    let cd_offset = out.len() as u32;
    out.extend_from_slice(&central);

    out.extend_from_slice(b"PK\x05\x06");
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    out.extend_from_slice(&(central.len() as u32).to_le_bytes());
    out.extend_from_slice(&cd_offset.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out
}

fn sample() -> Vec<u8> {
    let button = "export const Button = () => null;\n".repeat(40);
    build_zip(&[
        ("src/", "", false),
        ("src/components/Button.tsx", button.as_str(), true),
        ("src/components/Card.tsx", "export const Card = 1;\n", false),
        ("src/index.ts", "export * from './components';\n", true),
        ("README.md", "# sample\n", false),
    ])
}

#[tokio::test]
async fn lists_and_builds_tree() {
    let archive = ZipArchive::open(Arc::new(MemoryReader::new(sample())))
        .await
        .unwrap();
    assert_eq!(archive.entries().len(), 5);

    let session = BrowseSession::open(archive.records()).unwrap();
    let tree = session.tree();
    assert!(tree.get("src").unwrap().is_dir());
    assert!(tree.get("src/components").unwrap().is_inferred());
    assert_eq!(tree.get("src/components/Card.tsx").unwrap().size(), Some(23));
    assert_eq!(tree.file_count(), 4);

    let names: Vec<_> = tree.root().children.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, ["src", "README.md"]);
}

#[tokio::test]
async fn reads_stored_and_deflated_entries() {
    let archive = ZipArchive::open(Arc::new(MemoryReader::new(sample())))
        .await
        .unwrap();

    let card = archive.read("src/components/Card.tsx").await.unwrap();
    assert_eq!(card, b"export const Card = 1;\n");

    let button = archive.read("src/components/Button.tsx").await.unwrap();
    assert_eq!(button.len(), 34 * 40);
    assert!(archive.entry("src/components/Button.tsx").unwrap().compression_ratio() > 0);

    assert!(archive.read("src").await.is_err());
    assert!(archive.read("missing.txt").await.is_err());
}

#[tokio::test]
async fn extracts_selected_directory_under_prefix() {
    let dir = TempDir::new().unwrap();
    let zip_path = dir.path().join("app.zip");
    std::fs::write(&zip_path, sample()).unwrap();
    let out_dir = dir.path().join("out");

    let reader = Arc::new(LocalFileReader::new(&zip_path).unwrap());
    let archive = ZipArchive::open(reader).await.unwrap();
    let mut session = BrowseSession::open(archive.records()).unwrap();
    session.toggle("src/components").unwrap();

    let files = session.extract("dest");
    let destinations: Vec<_> = files.iter().map(|f| f.destination_path.as_str()).collect();
    assert_eq!(destinations, ["dest/Button.tsx", "dest/Card.tsx"]);

    for file in &files {
        let outcome = archive
            .materialize(file, &out_dir, OverwritePolicy::Skip)
            .await
            .unwrap();
        assert!(matches!(outcome, Materialized::Written { .. }));
    }

    assert_eq!(
        std::fs::read(out_dir.join("dest/Card.tsx")).unwrap(),
        b"export const Card = 1;\n"
    );
    assert!(out_dir.join("dest/Button.tsx").is_file());
    assert!(!out_dir.join("dest/index.ts").exists());
    assert!(!out_dir.join("README.md").exists());
}

#[tokio::test]
async fn overwrite_policies() {
    let dir = TempDir::new().unwrap();
    let archive = ZipArchive::open(Arc::new(MemoryReader::new(sample())))
        .await
        .unwrap();
    let mut session = BrowseSession::open(archive.records()).unwrap();
    session.toggle("README.md").unwrap();
    let files = session.extract("");
    assert_eq!(files.len(), 1);

    let target = dir.path().join("README.md");
    std::fs::write(&target, "local edits").unwrap();

    for policy in [OverwritePolicy::Skip, OverwritePolicy::Never] {
        let outcome = archive.materialize(&files[0], dir.path(), policy).await.unwrap();
        assert_eq!(
            outcome,
            Materialized::Skipped {
                path: target.clone(),
                policy
            }
        );
    }
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "local edits");

    let outcome = archive
        .materialize(&files[0], dir.path(), OverwritePolicy::Always)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Materialized::Written {
            path: target.clone(),
            bytes: 9
        }
    );
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "# sample\n");
}

#[tokio::test]
async fn pipes_payload_to_writer() {
    let archive = ZipArchive::open(Arc::new(MemoryReader::new(sample())))
        .await
        .unwrap();
    let mut sink = Vec::new();
    archive.write_to("src/index.ts", &mut sink).await.unwrap();
    assert_eq!(sink, b"export * from './components';\n");
}

#[tokio::test]
async fn rejects_non_zip_input() {
    let result = ZipArchive::open(Arc::new(MemoryReader::new(b"plain text, not an archive".to_vec()))).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn backslash_names_resolve_by_tree_path() {
    let dir = TempDir::new().unwrap();
    let zip = build_zip(&[("docs\\guide.md", "read me\n", false)]);
    let archive = ZipArchive::open(Arc::new(MemoryReader::new(zip)))
        .await
        .unwrap();

    let mut session = BrowseSession::open(archive.records()).unwrap();
    session.toggle("docs/guide.md").unwrap();
    let files = session.extract("");
    assert_eq!(files[0].source_path, "docs/guide.md");

    assert_eq!(archive.read("docs/guide.md").await.unwrap(), b"read me\n");
    let outcome = archive
        .materialize(&files[0], dir.path(), OverwritePolicy::Skip)
        .await
        .unwrap();
    assert!(matches!(outcome, Materialized::Written { bytes: 8, .. }));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("docs").join("guide.md")).unwrap(),
        "read me\n"
    );
}

#[tokio::test]
async fn oversized_declared_lengths_are_errors() {
    let text = "small payload\n".repeat(4);

    // Claims far more output than the entry inflates to.
    let zip = build_zip_declaring(&[("big.txt", text.as_str(), true)], Some((1 << 63, None)));
    let archive = ZipArchive::open(Arc::new(MemoryReader::new(zip)))
        .await
        .unwrap();
    assert_eq!(archive.entry("big.txt").unwrap().uncompressed_size, 1 << 63);
    assert!(archive.read("big.txt").await.is_err());

    // Claims compressed data that runs past the end of the archive.
    let zip = build_zip_declaring(
        &[("big.txt", text.as_str(), false)],
        Some((1 << 63, Some(1 << 62))),
    );
    let archive = ZipArchive::open(Arc::new(MemoryReader::new(zip)))
        .await
        .unwrap();
    assert_eq!(archive.entry("big.txt").unwrap().compressed_size, 1 << 62);
    let err = archive.read("big.txt").await.unwrap_err();
    assert!(err.to_string().contains("past the end"));

    let mut session = BrowseSession::open(archive.records()).unwrap();
    session.toggle("big.txt").unwrap();
    let dir = TempDir::new().unwrap();
    let files = session.extract("");
    assert!(
        archive
            .materialize(&files[0], dir.path(), OverwritePolicy::Always)
            .await
            .is_err()
    );
    assert!(!dir.path().join("big.txt").exists());
}
