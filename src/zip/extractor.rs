use std::collections::HashMap;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use flate2::Crc;
use flate2::read::DeflateDecoder;
use serde::Deserialize;
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use super::parser::ZipParser;
use super::structures::{CompressionMethod, ZipFileEntry};
use crate::io::ReadAt;
use crate::projection::ExtractedFile;
use crate::tree::ArchiveEntryRecord;

/// What to do when a destination file already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Leave the file and report it (suggesting `-o`).
    #[default]
    Skip,
    /// Leave the file, noting only that it exists.
    Never,
    /// Replace the file.
    Always,
}

/// Outcome of writing one extracted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Materialized {
    Written { path: PathBuf, bytes: u64 },
    Skipped { path: PathBuf, policy: OverwritePolicy },
}

/// An opened ZIP archive: central directory listing plus payload access
/// keyed by entry path.
pub struct ZipArchive<R: ReadAt> {
    parser: ZipParser<R>,
    entries: Vec<ZipFileEntry>,
    by_path: HashMap<String, usize>,
}

impl<R: ReadAt> ZipArchive<R> {
    /// Read the central directory of `reader`.
    pub async fn open(reader: Arc<R>) -> Result<Self> {
        let parser = ZipParser::new(reader);
        let entries = parser.list_files().await?;
        let by_path = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.path(), i))
            .collect();
        Ok(Self {
            parser,
            entries,
            by_path,
        })
    }

    /// Entries in central directory order.
    pub fn entries(&self) -> &[ZipFileEntry] {
        &self.entries
    }

    /// Tree builder input for every entry.
    pub fn records(&self) -> Vec<ArchiveEntryRecord> {
        self.entries.iter().map(ZipFileEntry::record).collect()
    }

    pub fn entry(&self, source_path: &str) -> Option<&ZipFileEntry> {
        self.by_path.get(source_path).map(|&i| &self.entries[i])
    }

    pub fn reader(&self) -> &Arc<R> {
        self.parser.reader()
    }

    /// Decoded bytes of the file at `source_path`.
    pub async fn read(&self, source_path: &str) -> Result<Vec<u8>> {
        let entry = self
            .entry(source_path)
            .ok_or_else(|| anyhow!("{source_path} is not in the archive"))?;
        self.read_entry(entry).await
    }

    /// Decode one entry, checking its size and CRC-32.
    pub async fn read_entry(&self, entry: &ZipFileEntry) -> Result<Vec<u8>> {
        if entry.is_directory {
            bail!("{} is a directory", entry.file_name);
        }

        let offset = self.parser.data_offset(entry).await?;
        let end = offset.checked_add(entry.compressed_size);
        if end.is_none_or(|end| end > self.parser.reader().size()) {
            bail!(
                "{}: {} compressed bytes at offset {offset} run past the end of the archive",
                entry.file_name,
                entry.compressed_size
            );
        }
        let mut raw = vec![0u8; usize::try_from(entry.compressed_size)?];
        self.parser.reader().read_exact_at(offset, &mut raw).await?;

        let data = match entry.compression_method {
            CompressionMethod::Stored => raw,
            CompressionMethod::Deflate => {
                // The declared size is only an upper bound.
                let mut out = Vec::new();
                DeflateDecoder::new(raw.as_slice())
                    .take(entry.uncompressed_size)
                    .read_to_end(&mut out)
                    .with_context(|| format!("failed to inflate {}", entry.file_name))?;
                out
            }
            CompressionMethod::Unknown(method) => {
                bail!(
                    "{}: unsupported compression method {method} (only STORED and DEFLATE)",
                    entry.file_name
                );
            }
        };

        if data.len() as u64 != entry.uncompressed_size {
            bail!(
                "{}: expected {} bytes, decoded {}",
                entry.file_name,
                entry.uncompressed_size,
                data.len()
            );
        }
        let mut crc = Crc::new();
        crc.update(&data);
        if crc.sum() != entry.crc32 {
            bail!("{}: CRC-32 mismatch", entry.file_name);
        }

        Ok(data)
    }

    /// Write the payload of `file` to `out_dir/<destination_path>`.
    pub async fn materialize(
        &self,
        file: &ExtractedFile,
        out_dir: &Path,
        policy: OverwritePolicy,
    ) -> Result<Materialized> {
        let path = destination(out_dir, &file.destination_path)?;

        if policy != OverwritePolicy::Always && fs::try_exists(&path).await? {
            debug!(path = %path.display(), ?policy, "destination exists, skipping");
            return Ok(Materialized::Skipped { path, policy });
        }

        let data = self.read(&file.source_path).await?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let mut out = fs::File::create(&path)
            .await
            .with_context(|| format!("cannot create {}", path.display()))?;
        out.write_all(&data).await?;
        out.flush().await?;

        info!(source = %file.source_path, path = %path.display(), bytes = data.len(), "extracted");
        Ok(Materialized::Written {
            path,
            bytes: data.len() as u64,
        })
    }

    /// Stream the payload of `source_path` into `writer`.
    pub async fn write_to<W: AsyncWrite + Unpin>(
        &self,
        source_path: &str,
        writer: &mut W,
    ) -> Result<()> {
        let data = self.read(source_path).await?;
        writer.write_all(&data).await?;
        Ok(())
    }
}

/// Join a `/`-separated destination path under `out_dir`, refusing
/// anything that would climb out of it.
fn destination(out_dir: &Path, destination_path: &str) -> Result<PathBuf> {
    let relative: PathBuf = destination_path.split('/').filter(|s| !s.is_empty()).collect();
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes || relative.as_os_str().is_empty() {
        bail!("refusing to write outside the output directory: {destination_path}");
    }
    Ok(out_dir.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_stays_inside_out_dir() {
        let out = Path::new("/tmp/out");
        assert_eq!(
            destination(out, "dest/components/Button.tsx").unwrap(),
            out.join("dest").join("components").join("Button.tsx")
        );
        assert_eq!(destination(out, "a//b").unwrap(), out.join("a").join("b"));
        assert!(destination(out, "../etc/passwd").is_err());
        assert!(destination(out, "a/../../b").is_err());
        assert!(destination(out, "").is_err());
    }

    #[test]
    fn overwrite_policy_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: OverwritePolicy,
        }
        let parsed: Wrapper = toml::from_str("policy = \"always\"").unwrap();
        assert_eq!(parsed.policy, OverwritePolicy::Always);
        assert_eq!(OverwritePolicy::default(), OverwritePolicy::Skip);
    }
}
