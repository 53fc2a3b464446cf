use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{Result, SiteError};

/// Source label for text typed or piped in directly.
pub const DIRECT_INPUT: &str = "直接输入的文本";

const PLACEHOLDER_TOPICS: [&str; 15] = [
    "的核心概念和基础知识",
    "的发展历程和演变过程",
    "的实际应用和案例分析",
    "的优势特点和价值体现",
    "的注意事项和潜在风险",
    "的学习方法和提升技巧",
    "的未来趋势和发展方向",
    "的相关工具和资源推荐",
    "的常见问题和解决方案",
    "的实践经验和心得分享",
    "在商业化方面的应用价值",
    "的市场前景和盈利模式",
    "的内容创作和表达技巧",
    "的学习成长和能力提升",
    "的深度思考和理解要点",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Text(String),
    File(PathBuf),
    Url(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    PlainText,
    Pdf,
}

/// Whether `text` is the real content or a stand-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    Verbatim,
    /// Generated from the file name; the PDF body was never parsed.
    Placeholder,
}

#[derive(Debug, Clone)]
pub struct Ingested {
    pub text: String,
    /// File name, or `DIRECT_INPUT`.
    pub source: String,
    pub format: Format,
    pub extraction: Extraction,
}

/// Turn any supported input into raw text.
pub async fn ingest(input: &Input) -> Result<Ingested> {
    match input {
        Input::Text(text) => Ok(Ingested {
            text: text.clone(),
            source: DIRECT_INPUT.to_string(),
            format: Format::PlainText,
            extraction: Extraction::Verbatim,
        }),
        Input::File(path) => ingest_file(path).await,
        Input::Url(url) => Err(SiteError::BackendRequired(url.clone())),
    }
}

async fn ingest_file(path: &Path) -> Result<Ingested> {
    let format = detect_format(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| SiteError::read(path, e))?;
    info!("Read {} ({} bytes)", path.display(), bytes.len());

    match format {
        Format::PlainText => {
            let text = String::from_utf8(bytes).map_err(|e| SiteError::read(path, e))?;
            Ok(Ingested {
                text,
                source: name,
                format,
                extraction: Extraction::Verbatim,
            })
        }
        Format::Pdf => {
            warn!("PDF text extraction is not supported; generating placeholder content from {}", name);
            Ok(Ingested {
                text: placeholder_text(&pdf_base_name(&name)),
                source: name,
                format,
                extraction: Extraction::Placeholder,
            })
        }
    }
}

fn detect_format(path: &Path) -> Result<Format> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "txt" => Ok(Format::PlainText),
        "pdf" => Ok(Format::Pdf),
        _ => Err(SiteError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// "营销手册.pdf" → "营销手册"
pub fn pdf_base_name(file_name: &str) -> String {
    let split = file_name.len().checked_sub(4);
    match split.and_then(|i| file_name.get(i..).map(|ext| (i, ext))) {
        Some((i, ext)) if ext.eq_ignore_ascii_case(".pdf") => file_name[..i].to_string(),
        _ => file_name.to_string(),
    }
}

/// Deterministic stand-in text for a PDF: a heading plus 15 numbered lines
/// about `base`.
pub fn placeholder_text(base: &str) -> String {
    let mut text = format!("{base}相关内容分析\n");
    for (i, topic) in PLACEHOLDER_TOPICS.iter().enumerate() {
        text.push_str(&format!("\n{:03} {base}{topic}", i + 1));
    }
    text
}
