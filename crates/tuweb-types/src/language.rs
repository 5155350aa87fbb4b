// ABOUTME: Content-type classification derived from file names
// ABOUTME: Static extension lookup table, unknown extensions fall back to plain text

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language / content-type tag stored on a tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    PlainText,
    TypeScript,
    JavaScript,
    Json,
    Html,
    Css,
    Scss,
    Less,
    Markdown,
    Python,
    Rust,
    Go,
    Java,
    C,
    Cpp,
    CSharp,
    Php,
    Ruby,
    Shell,
    Yaml,
    Xml,
    Sql,
    Dockerfile,
    Makefile,
}

/// Extension (lowercase, without the dot) to language
const EXTENSIONS: &[(&str, Language)] = &[
    ("ts", Language::TypeScript),
    ("tsx", Language::TypeScript),
    ("mts", Language::TypeScript),
    ("cts", Language::TypeScript),
    ("js", Language::JavaScript),
    ("jsx", Language::JavaScript),
    ("mjs", Language::JavaScript),
    ("cjs", Language::JavaScript),
    ("json", Language::Json),
    ("html", Language::Html),
    ("htm", Language::Html),
    ("css", Language::Css),
    ("scss", Language::Scss),
    ("less", Language::Less),
    ("md", Language::Markdown),
    ("markdown", Language::Markdown),
    ("py", Language::Python),
    ("rs", Language::Rust),
    ("go", Language::Go),
    ("java", Language::Java),
    ("c", Language::C),
    ("h", Language::C),
    ("cpp", Language::Cpp),
    ("cc", Language::Cpp),
    ("cxx", Language::Cpp),
    ("hpp", Language::Cpp),
    ("cs", Language::CSharp),
    ("php", Language::Php),
    ("rb", Language::Ruby),
    ("sh", Language::Shell),
    ("bash", Language::Shell),
    ("zsh", Language::Shell),
    ("yml", Language::Yaml),
    ("yaml", Language::Yaml),
    ("xml", Language::Xml),
    ("svg", Language::Xml),
    ("sql", Language::Sql),
    ("mk", Language::Makefile),
];

/// Whole file names that carry no useful extension
const FILE_NAMES: &[(&str, Language)] = &[
    ("dockerfile", Language::Dockerfile),
    ("containerfile", Language::Dockerfile),
    ("makefile", Language::Makefile),
    ("gnumakefile", Language::Makefile),
];

impl Language {
    /// Classify a file by name. Matching is case-insensitive.
    pub fn from_file_name(name: &str) -> Self {
        let file_name = name.rsplit(['/', '\\']).next().unwrap_or(name);
        let lower = file_name.to_ascii_lowercase();

        if let Some((_, language)) = FILE_NAMES.iter().find(|(known, _)| *known == lower) {
            return *language;
        }

        match lower.rsplit_once('.') {
            // A leading dot alone (".bashrc") is a hidden file, not an extension
            Some((stem, ext)) if !stem.is_empty() => Self::from_extension(ext),
            _ => Self::PlainText,
        }
    }

    /// Look up a bare extension such as `"ts"`
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.to_ascii_lowercase();
        EXTENSIONS
            .iter()
            .find(|(known, _)| *known == ext)
            .map(|(_, language)| *language)
            .unwrap_or_default()
    }

    /// Identifier understood by the text-editing widget
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlainText => "plaintext",
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
            Self::Json => "json",
            Self::Html => "html",
            Self::Css => "css",
            Self::Scss => "scss",
            Self::Less => "less",
            Self::Markdown => "markdown",
            Self::Python => "python",
            Self::Rust => "rust",
            Self::Go => "go",
            Self::Java => "java",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::CSharp => "csharp",
            Self::Php => "php",
            Self::Ruby => "ruby",
            Self::Shell => "shell",
            Self::Yaml => "yaml",
            Self::Xml => "xml",
            Self::Sql => "sql",
            Self::Dockerfile => "dockerfile",
            Self::Makefile => "makefile",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
