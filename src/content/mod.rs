//! Markdown resources shown on the dashboard page.
//!
//! Resources are read once at startup from the content directory. A file
//! missing on disk falls back to the copy compiled into the binary.

use pulldown_cmark::{html, Options, Parser};
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("content resource {0} is missing")]
    Missing(String),
}

/// How a missing or unreadable resource is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ReadMode {
    /// Propagate the error
    Strict,
    /// Log a warning and use an empty string
    #[default]
    Ignore,
}

impl ReadMode {
    /// Parse a mode name. Unknown names fall back to `Ignore` with a warning.
    pub fn parse(name: &str) -> ReadMode {
        match name.to_lowercase().as_str() {
            "strict" => ReadMode::Strict,
            "ignore" => ReadMode::Ignore,
            other => {
                tracing::warn!(mode = other, "Invalid content read mode, falling back to \"ignore\"");
                ReadMode::Ignore
            }
        }
    }
}

impl From<String> for ReadMode {
    fn from(name: String) -> Self {
        ReadMode::parse(&name)
    }
}

/// Markdown resources of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Title,
    About,
    ReportBug,
    Introduction,
    Contagions,
    Vaccines,
}

impl ContentKind {
    pub const ALL: [ContentKind; 6] = [
        ContentKind::Title,
        ContentKind::About,
        ContentKind::ReportBug,
        ContentKind::Introduction,
        ContentKind::Contagions,
        ContentKind::Vaccines,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            ContentKind::Title => "title.md",
            ContentKind::About => "about.md",
            ContentKind::ReportBug => "report_bug.md",
            ContentKind::Introduction => "introduction.md",
            ContentKind::Contagions => "contagions.md",
            ContentKind::Vaccines => "vaccines.md",
        }
    }
}

/// Default resources compiled into the binary.
#[derive(RustEmbed)]
#[folder = "share/dashboard/"]
struct DefaultContent;

/// Read a text file and strip surrounding newlines.
///
/// With `ReadMode::Ignore` failures are logged and an empty string is returned.
pub fn read_text(path: &Path, mode: ReadMode) -> Result<String, ContentError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text.trim_matches('\n').to_string()),
        Err(source) => match mode {
            ReadMode::Strict => Err(ContentError::Read {
                path: path.to_path_buf(),
                source,
            }),
            ReadMode::Ignore => {
                tracing::warn!(path = %path.display(), error = %source, "Failed to read content");
                Ok(String::new())
            }
        },
    }
}

/// Render CommonMark to HTML.
pub fn render_markdown(text: &str) -> String {
    let parser = Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES);
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn embedded(kind: ContentKind) -> Option<String> {
    DefaultContent::get(kind.file_name())
        .and_then(|file| String::from_utf8(file.data.into_owned()).ok())
        .map(|text| text.trim_matches('\n').to_string())
}

/// Immutable set of page resources, loaded once per process.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    texts: HashMap<ContentKind, String>,
}

impl ContentStore {
    /// Load every resource from `dir`.
    pub fn load(dir: &Path, mode: ReadMode) -> Result<Self, ContentError> {
        let mut texts = HashMap::new();

        for kind in ContentKind::ALL {
            let path = dir.join(kind.file_name());
            let text = if path.is_file() {
                read_text(&path, mode)?
            } else if let Some(text) = embedded(kind) {
                tracing::debug!(
                    file = kind.file_name(),
                    dir = %dir.display(),
                    "Content file not on disk, using built-in copy"
                );
                text
            } else {
                read_text(&path, mode)?
            };
            texts.insert(kind, text);
        }

        Ok(Self { texts })
    }

    /// Store holding only the built-in resources.
    pub fn builtin() -> Self {
        Self {
            texts: ContentKind::ALL
                .into_iter()
                .map(|kind| (kind, embedded(kind).unwrap_or_default()))
                .collect(),
        }
    }

    pub fn text(&self, kind: ContentKind) -> &str {
        self.texts.get(&kind).map(String::as_str).unwrap_or("")
    }

    pub fn html(&self, kind: ContentKind) -> String {
        render_markdown(self.text(kind))
    }

    /// Title as plain text, without markdown heading markers.
    pub fn title(&self) -> String {
        self.text(ContentKind::Title)
            .trim_start_matches('#')
            .trim()
            .to_string()
    }
}
