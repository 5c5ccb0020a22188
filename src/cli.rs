use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::warn;

use crate::session::BrowseSession;
use crate::zip::OverwritePolicy;

#[derive(Parser, Debug)]
#[command(name = "ziptree")]
#[command(version)]
#[command(about = "Browse a ZIP archive as a tree and extract only what you select", long_about = None)]
#[command(after_help = "Examples:\n  \
  ziptree -t app.zip src                 show the tree with src/ selected\n  \
  ziptree app.zip src/components -d out  extract src/components/* into out/\n  \
  ziptree app.zip 'src/*' -x src/tests   select everything under src except src/tests\n  \
  ziptree --dry-run --json https://example.com/app.zip docs")]
pub struct Cli {
    /// ZIP file path or HTTP URL
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Entries to toggle, in order; glob patterns only ever select (default: all)
    #[arg(value_name = "PATHS")]
    pub paths: Vec<String>,

    /// List entries (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List entries verbosely
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Show the archive tree with the selection marked
    #[arg(short = 't')]
    pub tree: bool,

    /// Extract files to pipe, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Extract files into exdir
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<PathBuf>,

    /// Re-root extracted files under this prefix
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Exclude files that follow
    #[arg(short = 'x', value_name = "PATTERN", num_args = 1..)]
    pub exclude: Vec<String>,

    /// Never overwrite existing files
    #[arg(short = 'n', conflicts_with = "overwrite")]
    pub never_overwrite: bool,

    /// Overwrite files WITHOUT prompting
    #[arg(short = 'o')]
    pub overwrite: bool,

    /// Print what would be extracted without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print extracted file descriptors as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Start from a selection saved with --save-selection
    #[arg(long, value_name = "FILE")]
    pub selection: Option<PathBuf>,

    /// Save the resulting selection as JSON
    #[arg(long, value_name = "FILE")]
    pub save_selection: Option<PathBuf>,

    /// Config file (default: $ZIPTREE_CONFIG)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        crate::io::is_http_url(&self.file)
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe
    }

    /// Command line flags win over the configured policy.
    pub fn overwrite_policy(&self, configured: OverwritePolicy) -> OverwritePolicy {
        if self.overwrite {
            OverwritePolicy::Always
        } else if self.never_overwrite {
            OverwritePolicy::Never
        } else {
            configured
        }
    }

    /// Log filter used when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        match self.quiet {
            0 => "ziptree=warn",
            1 => "ziptree=error",
            _ => "off",
        }
    }
}

/// Check if a pattern contains glob wildcard characters.
pub fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Glob match where `*` spans any run of characters (including `/`) and
/// `?` matches exactly one.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    fn do_match(pattern: &[char], text: &[char]) -> bool {
        match (pattern.first(), text.first()) {
            (None, None) => true,
            (Some('*'), _) => {
                do_match(&pattern[1..], text) || (!text.is_empty() && do_match(pattern, &text[1..]))
            }
            (Some('?'), Some(_)) => do_match(&pattern[1..], &text[1..]),
            (Some(p), Some(t)) if p == t => do_match(&pattern[1..], &text[1..]),
            _ => false,
        }
    }

    do_match(&pattern, &text)
}

/// Apply positional paths to the session's selection.
///
/// Exact paths are toggled in order, so naming a directory and then one of
/// its subdirectories selects the first and carves out the second. Glob
/// patterns select every match that is not already selected. With no paths
/// and an empty selection, every top-level entry is selected.
pub fn apply_paths(session: &mut BrowseSession, paths: &[String]) -> Result<()> {
    let (tree, selection) = session.selection_mut();

    if paths.is_empty() {
        if selection.is_empty() {
            for child in &tree.root().children {
                selection.toggle(tree, &child.path)?;
            }
        }
        return Ok(());
    }

    for pattern in paths {
        if has_glob_chars(pattern) {
            let matched: Vec<String> = tree
                .walk()
                .filter(|(_, node)| glob_match(pattern, &node.path))
                .map(|(_, node)| node.path.clone())
                .collect();
            if matched.is_empty() {
                warn!(pattern = %pattern, "pattern matched no entries");
            }
            for path in matched {
                selection.ensure_selected(tree, &path)?;
            }
        } else {
            selection.toggle(tree, pattern.trim_end_matches('/'))?;
        }
    }
    Ok(())
}

/// True when `source_path` is named by, lies under, or matches one of the
/// `-x` patterns.
pub fn is_excluded(patterns: &[String], source_path: &str) -> bool {
    patterns.iter().any(|pattern| {
        let pattern = pattern.trim_end_matches('/');
        source_path == pattern
            || source_path
                .strip_prefix(pattern)
                .is_some_and(|rest| rest.starts_with('/'))
            || glob_match(pattern, source_path)
    })
}
