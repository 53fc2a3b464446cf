pub mod aggregate;
pub mod categorize;
pub mod filter;

use tracing::info;

use crate::clock::Clock;
use crate::config::{FilterChoice, PolicyChoice};
use crate::error::{Result, SiteError};
use crate::ingest::{pdf_base_name, Format, Ingested};
use crate::site::SiteData;
use categorize::{Policy, RandomSource};
use filter::FilterMode;

const TITLE_CHARS: usize = 50;
const DESCRIPTION_CHARS: usize = 200;
const FALLBACK_TITLE: &str = "生成的网站";
const FALLBACK_DESCRIPTION: &str = "基于上传内容生成的知识网站";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub policy: Policy,
    pub filter: FilterMode,
}

impl Options {
    /// `Auto` picks the strict filter and dynamic themes for PDFs, the simple
    /// filter and the book's four sections for everything else.
    pub fn resolve(format: Format, policy: PolicyChoice, filter: FilterChoice) -> Self {
        let pdf = format == Format::Pdf;
        Options {
            policy: match policy {
                PolicyChoice::Fixed => Policy::Fixed,
                PolicyChoice::Dynamic => Policy::Dynamic,
                PolicyChoice::Auto if pdf => Policy::Dynamic,
                PolicyChoice::Auto => Policy::Fixed,
            },
            filter: match filter {
                FilterChoice::Simple => FilterMode::Simple,
                FilterChoice::Strict => FilterMode::Strict,
                FilterChoice::Auto if pdf => FilterMode::Strict,
                FilterChoice::Auto => FilterMode::Simple,
            },
        }
    }
}

/// Title, description and origin label for the generated site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteMeta {
    pub title: String,
    pub description: String,
    pub source: String,
}

impl SiteMeta {
    /// Explicit values win; otherwise PDFs are named after the file and text
    /// is named after its own first lines.
    pub fn derive(ingested: &Ingested, title: Option<&str>, description: Option<&str>) -> Self {
        let explicit = |v: Option<&str>| v.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);

        let (auto_title, auto_description) = match ingested.format {
            Format::Pdf => (
                pdf_base_name(&ingested.source),
                format!("基于PDF文件\"{}\"自动生成的知识分享网站", ingested.source),
            ),
            Format::PlainText => {
                let mut lines = ingested.text.lines().map(str::trim).filter(|l| !l.is_empty());
                let title = lines.next().map(|l| truncate_chars(l, TITLE_CHARS)).unwrap_or_default();
                let rest: Vec<&str> = lines.take(2).collect();
                (title, truncate_chars(&rest.join(" "), DESCRIPTION_CHARS))
            }
        };

        SiteMeta {
            title: explicit(title)
                .or_else(|| Some(auto_title).filter(|t| !t.is_empty()))
                .unwrap_or_else(|| FALLBACK_TITLE.to_string()),
            description: explicit(description)
                .or_else(|| Some(auto_description).filter(|d| !d.is_empty()))
                .unwrap_or_else(|| FALLBACK_DESCRIPTION.to_string()),
            source: ingested.source.clone(),
        }
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Four-stage pipeline: raw text → lines → categorized items → site data.
///
/// Pure apart from `rng` and `clock`; returns either a complete, validated
/// `SiteData` or an error.
pub fn generate(
    raw: &str,
    meta: SiteMeta,
    options: &Options,
    rng: &mut dyn RandomSource,
    clock: &dyn Clock,
) -> Result<SiteData> {
    let lines = filter::candidate_lines(raw, options.filter);
    if lines.is_empty() {
        return Err(SiteError::EmptyInput);
    }
    info!("{} candidate lines ({:?} filter)", lines.len(), options.filter);

    let categorized = categorize::categorize(&lines, options.policy, rng)?;
    let categories = aggregate::aggregate(&categorized.categories, &categorized.items);
    aggregate::validate(&categories, &categorized.items)?;

    for c in &categories {
        info!("  {:<12} {:<8} {}", c.id, c.title, c.count);
    }

    Ok(SiteData {
        title: meta.title,
        description: meta.description,
        source: meta.source,
        categories,
        content: categorized.items,
        generated_at: clock.now(),
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::ingest::{placeholder_text, Extraction, DIRECT_INPUT};
    use categorize::SeededRandom;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    const SIMPLE: Options = Options { policy: Policy::Fixed, filter: FilterMode::Simple };
    const STRICT: Options = Options { policy: Policy::Dynamic, filter: FilterMode::Strict };

    fn meta() -> SiteMeta {
        SiteMeta {
            title: "一人企业复利商业化".into(),
            description: "读书笔记".into(),
            source: "直接输入的文本".into(),
        }
    }

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap())
    }

    fn run(raw: &str, options: &Options, seed: u64) -> Result<SiteData> {
        generate(raw, meta(), options, &mut SeededRandom::new(seed), &clock())
    }

    fn fixture() -> String {
        std::fs::read_to_string("tests/fixtures/book_notes.txt").unwrap()
    }

    #[test]
    fn priority_example() {
        let site = run("001 如何通过写作赚钱\n002 这是一个陷阱警告", &SIMPLE, 1).unwrap();
        let cats: Vec<&str> = site.content.iter().map(|i| i.category.as_str()).collect();
        assert_eq!(cats, vec!["money", "pitfalls"]);
        assert_eq!(site.category("money").unwrap().count, 1);
        assert_eq!(site.category("writing").unwrap().count, 0);
    }

    #[test]
    fn ids_follow_filtered_lines() {
        let raw = fixture();
        for options in [SIMPLE, STRICT] {
            let lines = filter::candidate_lines(&raw, options.filter);
            let site = run(&raw, &options, 3).unwrap();
            assert_eq!(site.content.len(), lines.len());
            for (i, (item, line)) in site.content.iter().zip(&lines).enumerate() {
                assert_eq!(item.id as usize, i + 1);
                assert_eq!(&item.content, line);
            }
        }
    }

    #[test]
    fn categories_cover_every_item() {
        let raw = fixture();
        for options in [SIMPLE, STRICT] {
            let site = run(&raw, &options, 11).unwrap();
            for item in &site.content {
                assert!(site.category(&item.category).is_some(), "orphan {}", item.category);
            }
            let total: usize = site.categories.iter().map(|c| c.count).sum();
            assert_eq!(total, site.content.len());
        }
    }

    #[test]
    fn seeded_runs_are_identical() {
        let raw = fixture();
        assert_eq!(run(&raw, &SIMPLE, 42).unwrap(), run(&raw, &SIMPLE, 42).unwrap());
        assert_eq!(run(&raw, &STRICT, 42).unwrap(), run(&raw, &STRICT, 42).unwrap());
    }

    #[test]
    fn short_lines_never_appear() {
        let site = run("ok\n这是一条足够长的关于赚钱的内容", &SIMPLE, 0).unwrap();
        assert_eq!(site.content.len(), 1);
        assert!(site.content.iter().all(|i| i.content != "ok"));
    }

    #[test]
    fn nothing_usable_is_empty_input() {
        assert!(matches!(run("", &SIMPLE, 0), Err(SiteError::EmptyInput)));
        assert!(matches!(run("ok\n短句\n   ", &SIMPLE, 0), Err(SiteError::EmptyInput)));
        assert!(matches!(run("第一章 一个很长很长的章节标题\n1234567890123", &STRICT, 0), Err(SiteError::EmptyInput)));
    }

    fn ingested(text: &str, source: &str, format: Format) -> Ingested {
        Ingested {
            text: text.into(),
            source: source.into(),
            format,
            extraction: Extraction::Verbatim,
        }
    }

    #[test]
    fn meta_from_text_lines() {
        let input = ingested("\n  书名在第一行  \n第二行\n\n第三行\n第四行", DIRECT_INPUT, Format::PlainText);
        let meta = SiteMeta::derive(&input, None, None);
        assert_eq!(meta.title, "书名在第一行");
        assert_eq!(meta.description, "第二行 第三行");
        assert_eq!(meta.source, DIRECT_INPUT);
    }

    #[test]
    fn meta_title_is_capped() {
        let long = "长".repeat(80);
        let meta = SiteMeta::derive(&ingested(&long, DIRECT_INPUT, Format::PlainText), None, None);
        assert_eq!(meta.title.chars().count(), 50);
        assert_eq!(meta.description, FALLBACK_DESCRIPTION);
    }

    #[test]
    fn meta_explicit_values_win() {
        let input = ingested("第一行\n第二行", DIRECT_INPUT, Format::PlainText);
        let meta = SiteMeta::derive(&input, Some("我的站点"), Some("  "));
        assert_eq!(meta.title, "我的站点");
        // blank counts as not given
        assert_eq!(meta.description, "第二行");

        let meta = SiteMeta::derive(&ingested("", DIRECT_INPUT, Format::PlainText), None, None);
        assert_eq!(meta.title, FALLBACK_TITLE);
    }

    #[test]
    fn meta_from_pdf_name() {
        let input = ingested("", "营销手册.pdf", Format::Pdf);
        let meta = SiteMeta::derive(&input, None, None);
        assert_eq!(meta.title, "营销手册");
        assert_eq!(meta.description, "基于PDF文件\"营销手册.pdf\"自动生成的知识分享网站");
    }

    #[test]
    fn auto_options_follow_format() {
        let pdf = Options::resolve(Format::Pdf, PolicyChoice::Auto, FilterChoice::Auto);
        assert_eq!(pdf, STRICT);
        let text = Options::resolve(Format::PlainText, PolicyChoice::Auto, FilterChoice::Auto);
        assert_eq!(text, SIMPLE);
        let mixed = Options::resolve(Format::PlainText, PolicyChoice::Dynamic, FilterChoice::Strict);
        assert_eq!(mixed, STRICT);
    }

    #[test]
    fn pdf_placeholder_end_to_end() {
        let text = placeholder_text("营销手册");
        let site = run(&text, &STRICT, 5).unwrap();
        assert_eq!(site.content.len(), 15);
        assert!(site.content.iter().all(|i| i.content.contains("营销手册")));
        assert!((3..=5).contains(&site.categories.len()));
        assert!(site.categories.iter().all(|c| c.id.starts_with("category_")));
    }

    #[test]
    fn metadata_and_clock_pass_through() {
        let site = run("这是一条足够长的关于赚钱的内容", &SIMPLE, 0).unwrap();
        assert_eq!(site.title, "一人企业复利商业化");
        assert_eq!(site.source, "直接输入的文本");
        assert_eq!(site.generated_at, clock().0);
    }
}
