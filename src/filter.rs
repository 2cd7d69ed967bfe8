use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Coarse file category used to restrict candidates by extension before any
/// name or content test runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TypeFilter {
    #[default]
    All,
    Text,
    Document,
    Image,
    Audio,
    Video,
}

impl TypeFilter {
    pub const ALL: [TypeFilter; 6] = [
        TypeFilter::All,
        TypeFilter::Text,
        TypeFilter::Document,
        TypeFilter::Image,
        TypeFilter::Audio,
        TypeFilter::Video,
    ];

    /// Lowercase extensions (without the dot) belonging to this category.
    /// Empty for `All`, which accepts every file.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            TypeFilter::All => &[],
            TypeFilter::Text => &["txt"],
            TypeFilter::Document => &["doc", "docx", "pdf", "rtf"],
            TypeFilter::Image => &["jpg", "jpeg", "png", "gif", "bmp"],
            TypeFilter::Audio => &["mp3", "wav", "flac", "aac"],
            TypeFilter::Video => &["mp4", "avi", "mov", "mkv"],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TypeFilter::All => "all",
            TypeFilter::Text => "text",
            TypeFilter::Document => "document",
            TypeFilter::Image => "image",
            TypeFilter::Audio => "audio",
            TypeFilter::Video => "video",
        }
    }

    /// Whether a lowercased extension passes this filter.
    pub fn accepts(self, ext: &str) -> bool {
        match self {
            TypeFilter::All => true,
            other => other.extensions().contains(&ext),
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TypeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeFilter::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown file type filter: {s}"))
    }
}

/// Extensions whose content is worth decoding as text.
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "py", "js", "html", "css", "xml", "json", "md", "log", "ini", "cfg", "conf", "yml",
    "yaml", "csv", "sql", "sh", "bat", "c", "cpp", "java", "h", "hpp", "rs", "ts", "toml",
];

pub fn is_text_extension(ext: &str) -> bool {
    TEXT_EXTENSIONS.contains(&ext)
}

/// Lowercased extension of `path`, or an empty string when it has none.
pub(crate) fn extension_lower(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
