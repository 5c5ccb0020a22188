/// Kind reported when no rule matches.
pub const DEFAULT_CONTENT_KIND: &str = "application/octet-stream";

const BUILTIN: &[(&str, &str)] = &[
    ("json", "application/json"),
    ("md", "text/markdown"),
    ("txt", "text/plain"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("js", "text/javascript"),
    ("mjs", "text/javascript"),
    ("jsx", "text/javascript"),
    ("ts", "text/typescript"),
    ("tsx", "text/typescript"),
    ("svg", "image/svg+xml"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("toml", "application/toml"),
    ("yaml", "application/yaml"),
    ("yml", "application/yaml"),
    ("xml", "application/xml"),
    ("csv", "text/csv"),
    ("rs", "text/x-rust"),
    ("py", "text/x-python"),
];

/// Ordered extension to content-kind table. The first matching rule wins.
///
/// Extensions are compared case-insensitively against the end of the file
/// name, so multi-part extensions such as `d.ts` or `tar.gz` work as long as
/// they come before their shorter suffixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentKinds {
    rules: Vec<(String, String)>,
}

impl Default for ContentKinds {
    fn default() -> Self {
        Self {
            rules: BUILTIN
                .iter()
                .map(|(ext, kind)| (ext.to_string(), kind.to_string()))
                .collect(),
        }
    }
}

impl ContentKinds {
    /// A table with no rules; everything maps to [`DEFAULT_CONTENT_KIND`].
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a rule that takes priority over every existing one.
    pub fn with_override(mut self, extension: &str, kind: &str) -> Self {
        self.rules.insert(0, (normalize(extension), kind.to_string()));
        self
    }

    /// Add a rule consulted after every existing one.
    pub fn push(&mut self, extension: &str, kind: &str) {
        self.rules.push((normalize(extension), kind.to_string()));
    }

    pub fn infer(&self, file_name: &str) -> &str {
        let name = file_name.to_ascii_lowercase();
        self.rules
            .iter()
            .find(|(ext, _)| {
                name.len() > ext.len()
                    && name.ends_with(ext.as_str())
                    && name.as_bytes()[name.len() - ext.len() - 1] == b'.'
            })
            .map(|(_, kind)| kind.as_str())
            .unwrap_or(DEFAULT_CONTENT_KIND)
    }
}

fn normalize(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}
