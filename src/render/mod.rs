pub mod bundle;
pub mod page;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SiteError};
use crate::site::SiteData;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Embedded site data plus a script that filters by category.
    #[default]
    Interactive,
    /// Plain HTML grouped by category, no script.
    Static,
}

/// Escape HTML special characters.
pub fn escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Site data as JSON that is safe inside a `<script>` element.
///
/// `<` only ever occurs inside JSON strings, so `\u003c` decodes to the same
/// value while making `</script>` impossible.
pub fn embed_json(site: &SiteData) -> Result<String> {
    Ok(serde_json::to_string(site)?.replace('<', "\\u003c"))
}

/// Emoji shown on a category card.
pub fn category_icon(id: &str) -> &'static str {
    match id {
        "money" => "💰",
        "pitfalls" => "⚠️",
        "writing" => "✍️",
        "growth" => "📈",
        _ => "📄",
    }
}

/// `{title}.html` with characters that are unsafe in file names replaced.
pub fn file_name_for(title: &str, extension: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = cleaned.trim().trim_matches('.');
    let stem = if stem.is_empty() { "site" } else { stem };
    format!("{stem}.{extension}")
}

/// Write `contents` to `path` via a sibling temp file and a rename, so a
/// failed write never leaves a truncated file behind.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| render_error(parent, e))?;
    }

    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".part");
    let tmp = PathBuf::from(tmp);

    if let Err(e) = std::fs::write(&tmp, contents) {
        let _ = std::fs::remove_file(&tmp);
        return Err(render_error(&tmp, e));
    }
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        render_error(path, e)
    })
}

fn render_error(path: &Path, source: std::io::Error) -> SiteError {
    SiteError::Render {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
        assert_eq!(escape("普通文本"), "普通文本");
    }

    #[test]
    fn file_names() {
        assert_eq!(file_name_for("一人企业复利商业化", "html"), "一人企业复利商业化.html");
        assert_eq!(file_name_for("a/b: c?", "html"), "a_b_ c_.html");
        assert_eq!(file_name_for("  ", "json"), "site.json");
        assert_eq!(file_name_for("..", "html"), "site.html");
    }

    #[test]
    fn atomic_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.html");
        write_atomic(&path, "<p>ok</p>").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>ok</p>");
        let names: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![OsString::from("out.html")]);
    }

    #[test]
    fn icons() {
        assert_eq!(category_icon("money"), "💰");
        assert_eq!(category_icon("category_0"), "📄");
    }
}
