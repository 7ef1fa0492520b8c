use std::path::Path;

use smol_str::SmolStr;

/// File type classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileType {
    /// Markdown file
    Markdown,
    /// Code file with language identifier
    Code(SmolStr),
    /// Plain text file
    PlainText,
}

impl FileType {
    /// Detect file type from file extension
    pub fn from_path(path: &Path) -> Self {
        let language = match path.extension().and_then(|e| e.to_str()) {
            Some("md") | Some("markdown") => return FileType::Markdown,
            Some("rs") => "rust",
            Some("py") => "python",
            Some("js") | Some("mjs") | Some("cjs") => "javascript",
            Some("ts") => "typescript",
            Some("tsx") => "typescriptreact",
            Some("jsx") => "javascriptreact",
            Some("go") => "go",
            Some("java") => "java",
            Some("cpp") | Some("cc") | Some("cxx") | Some("c++") => "cpp",
            Some("c") => "c",
            Some("h") | Some("hpp") | Some("hxx") => "cpp",
            Some("cs") => "csharp",
            Some("json") => "json",
            Some("toml") => "toml",
            Some("yaml") | Some("yml") => "yaml",
            Some("html") | Some("htm") => "html",
            Some("css") => "css",
            Some("xml") => "xml",
            Some("sh") | Some("bash") | Some("zsh") => "bash",
            Some("rb") => "ruby",
            Some("php") => "php",
            Some("swift") => "swift",
            Some("kt") | Some("kts") => "kotlin",
            Some("scala") => "scala",
            Some("hs") => "haskell",
            Some("lua") => "lua",
            Some("sql") => "sql",
            _ => return FileType::PlainText,
        };

        FileType::Code(SmolStr::new_static(language))
    }

    /// Language identifier used to look up syntax tables
    pub fn language(&self) -> Option<&str> {
        match self {
            FileType::Code(lang) => Some(lang.as_str()),
            FileType::Markdown => Some("markdown"),
            FileType::PlainText => None,
        }
    }

    /// Token syntect understands for this language
    pub fn syntect_token(&self) -> Option<&str> {
        match self {
            FileType::Code(lang) => Some(match lang.as_str() {
                "python" => "py",
                "javascript" | "javascriptreact" => "js",
                "typescript" | "typescriptreact" => "ts",
                "csharp" => "cs",
                "bash" => "sh",
                "ruby" => "rb",
                "haskell" => "hs",
                other => other,
            }),
            FileType::Markdown => Some("md"),
            FileType::PlainText => None,
        }
    }

    /// Get human-readable name for this file type
    pub fn display_name(&self) -> &str {
        match self {
            FileType::Markdown => "Markdown",
            FileType::Code(lang) => lang.as_str(),
            FileType::PlainText => "Plain Text",
        }
    }
}
