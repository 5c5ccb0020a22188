//! Main entry point for the ziptree CLI application.
//!
//! Lists, renders or extracts a selection from a ZIP archive on the local
//! filesystem or behind an HTTP URL.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use ziptree::cli::{apply_paths, is_excluded};
use ziptree::io::is_archive_name;
use ziptree::render::{format_size, render_tree};
use ziptree::{
    BrowseSession, Cli, Config, HttpRangeReader, LocalFileReader, Materialized, OverwritePolicy,
    ReadAt, Selection, SelectionSummary, ZipArchive,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);
    let config = Config::load(cli.config.as_deref())?;

    if cli.is_http_url() {
        let reader = Arc::new(HttpRangeReader::new(cli.file.clone(), config.http.clone()).await?);
        process_zip(reader.clone(), &cli, &config).await?;

        if !cli.is_quiet() {
            eprintln!(
                "\nTotal bytes transferred: {}",
                format_size(reader.transferred_bytes())
            );
        }
    } else {
        let reader = Arc::new(LocalFileReader::new(Path::new(&cli.file))?);
        process_zip(reader, &cli, &config).await?;
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` overrides the `-q` derived default.
fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.default_log_filter()));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

async fn process_zip<R: ReadAt + 'static>(reader: Arc<R>, cli: &Cli, config: &Config) -> Result<()> {
    let archive = ZipArchive::open(reader).await.with_context(|| {
        if is_archive_name(&cli.file) && !cli.file.to_ascii_lowercase().ends_with(".zip") {
            format!("{}: only ZIP archives are supported", cli.file)
        } else {
            format!("{}: cannot read ZIP central directory", cli.file)
        }
    })?;

    if cli.list || cli.verbose {
        list_entries(&archive, cli.verbose);
        return Ok(());
    }

    let mut session =
        BrowseSession::open(archive.records())?.with_content_kinds(config.content_kinds());
    if let Some(path) = &cli.selection {
        session.restore(load_selection(path)?);
    }
    apply_paths(&mut session, &cli.paths)?;
    if let Some(path) = &cli.save_selection {
        save_selection(path, session.selection())?;
    }

    if cli.tree {
        print!("{}", render_tree(session.tree(), session.selection()));
        let summary = session.summary();
        println!(
            "{} selected, {} files, {}",
            summary.entries,
            summary.files,
            format_size(summary.bytes)
        );
        return Ok(());
    }

    let prefix = cli
        .prefix
        .as_deref()
        .unwrap_or(&config.extract.destination_prefix);
    let files: Vec<_> = session
        .extract(prefix)
        .into_iter()
        .filter(|f| !is_excluded(&cli.exclude, &f.source_path))
        .collect();

    if cli.json {
        for file in &files {
            println!("{}", serde_json::to_string(file)?);
        }
    }

    if cli.dry_run {
        if !cli.json {
            for file in &files {
                println!(
                    "{} -> {}  ({}, {})",
                    file.source_path,
                    file.destination_path,
                    format_size(file.size),
                    file.content_kind
                );
            }
        }
        return Ok(());
    }

    if cli.pipe {
        let mut stdout = tokio::io::stdout();
        let show_names = files.len() > 1;
        for file in &files {
            if show_names {
                stdout
                    .write_all(format!("--- {} ---\n", file.source_path).as_bytes())
                    .await?;
            }
            archive.write_to(&file.source_path, &mut stdout).await?;
        }
        stdout.flush().await?;
        return Ok(());
    }

    let out_dir = cli.extract_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let policy = cli.overwrite_policy(config.extract.overwrite);
    let mut written = Vec::with_capacity(files.len());

    for file in &files {
        match archive.materialize(file, &out_dir, policy).await? {
            Materialized::Written { path, .. } => {
                if !cli.is_quiet() && !cli.json {
                    println!("  extracting: {}", path.display());
                }
                written.push(file.clone());
            }
            Materialized::Skipped { path, policy } => {
                if policy == OverwritePolicy::Skip && !cli.is_quiet() {
                    eprintln!("Skipping: {} (use -o to overwrite)", path.display());
                } else if !cli.is_quiet() {
                    eprintln!("Skipping: {} (file exists)", path.display());
                }
            }
        }
    }

    if !cli.is_quiet() && !cli.json {
        let summary = SelectionSummary::new(session.selection(), &written);
        println!(
            "{} of {} files extracted, {}",
            summary.files,
            files.len(),
            format_size(summary.bytes)
        );
    }

    Ok(())
}

/// Print archive entries, optionally as a table with sizes and timestamps.
fn list_entries<R: ReadAt>(archive: &ZipArchive<R>, verbose: bool) {
    if verbose {
        println!(
            "{:>10}  {:>10}  {:>5}  {:>10}  {:>5}  Name",
            "Length", "Size", "Cmpr", "Date", "Time"
        );
        println!("{}", "-".repeat(70));
    }

    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for entry in archive.entries() {
        if !verbose {
            println!("{}", entry.file_name);
            continue;
        }

        let (year, month, day) = entry.mod_date();
        let (hour, minute, _second) = entry.mod_time();
        println!(
            "{:>10}  {:>10}  {:>4}%  {:04}-{:02}-{:02}  {:02}:{:02}  {}",
            entry.uncompressed_size,
            entry.compressed_size,
            entry.compression_ratio(),
            year,
            month,
            day,
            hour,
            minute,
            entry.file_name
        );

        if !entry.is_directory {
            total_uncompressed += entry.uncompressed_size;
            total_compressed += entry.compressed_size;
            file_count += 1;
        }
    }

    if verbose {
        println!("{}", "-".repeat(70));
        let ratio = if total_uncompressed > 0 && total_compressed < total_uncompressed {
            100 - total_compressed * 100 / total_uncompressed
        } else {
            0
        };
        println!(
            "{:>10}  {:>10}  {:>4}%  {:>17}  {} files",
            total_uncompressed, total_compressed, ratio, "", file_count
        );
    }
}

fn load_selection(path: &Path) -> Result<Selection> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read selection {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid selection {}", path.display()))
}

fn save_selection(path: &Path, selection: &Selection) -> Result<()> {
    let text = serde_json::to_string_pretty(selection)?;
    std::fs::write(path, text).with_context(|| format!("cannot write selection {}", path.display()))
}
