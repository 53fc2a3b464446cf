use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::{Result, SiteError};
use crate::site::ContentItem;

/// Fewest themes the dynamic policy declares once anything matched.
const MIN_THEMES: usize = 3;
/// Most themes the dynamic policy declares.
const MAX_THEMES: usize = 5;

/// The only source of non-determinism in a run: picks the bucket for a line
/// that matched no keywords.
pub trait RandomSource {
    /// Return an index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
}

pub struct SeededRandom(StdRng);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        SeededRandom(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        SeededRandom(StdRng::from_entropy())
    }
}

impl RandomSource for SeededRandom {
    fn pick(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// The book's four sections, first keyword match wins.
    Fixed,
    /// Three to five themes chosen from the text, best keyword score wins.
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Description {
    /// "{blurb} ({n}条内容)"
    Blurb(&'static str),
    /// "{title}相关内容 ({n}条)"
    Related,
}

/// A declared bucket, before counts are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDef {
    pub id: String,
    pub title: String,
    pub keywords: &'static [&'static str],
    pub description: Description,
}

impl CategoryDef {
    pub fn describe(&self, count: usize) -> String {
        match self.description {
            Description::Blurb(blurb) => format!("{blurb} ({count}条内容)"),
            Description::Related => format!("{}相关内容 ({count}条)", self.title),
        }
    }

    fn matches(&self, lower: &str) -> bool {
        self.keywords.iter().any(|kw| lower.contains(kw))
    }

    fn score(&self, lower: &str) -> usize {
        self.keywords.iter().filter(|kw| lower.contains(*kw)).count()
    }
}

/// Output of the categorizer: the declared buckets plus one item per line.
#[derive(Debug, Clone)]
pub struct Categorized {
    pub categories: Vec<CategoryDef>,
    pub items: Vec<ContentItem>,
}

struct Section {
    id: &'static str,
    title: &'static str,
    blurb: &'static str,
    keywords: &'static [&'static str],
}

// Priority order: a line mentioning both money and writing is a money line.
const SECTIONS: [Section; 4] = [
    Section {
        id: "money",
        title: "赚钱篇",
        blurb: "探索商业化的方法与路径",
        keywords: &["赚钱", "收入", "盈利", "商业", "money", "income", "profit", "revenue", "business"],
    },
    Section {
        id: "pitfalls",
        title: "避坑篇",
        blurb: "识别常见陷阱和风险",
        keywords: &["避免", "陷阱", "错误", "风险", "avoid", "trap", "mistake", "risk", "pitfall"],
    },
    Section {
        id: "writing",
        title: "写作篇",
        blurb: "掌握内容创作方法",
        keywords: &["写作", "内容", "文章", "创作", "writ", "article", "content"],
    },
    Section {
        id: "growth",
        title: "成长篇",
        blurb: "持续精进和发展",
        keywords: &["成长", "学习", "提升", "发展", "growth", "learn", "improve", "develop"],
    },
];

struct Theme {
    title: &'static str,
    keywords: &'static [&'static str],
}

const THEMES: [Theme; 10] = [
    Theme { title: "商业经营", keywords: &["商业", "经营", "营销", "销售", "客户", "市场", "品牌", "推广"] },
    Theme { title: "技术开发", keywords: &["技术", "开发", "编程", "代码", "系统", "软件", "算法", "架构"] },
    Theme { title: "学习成长", keywords: &["学习", "成长", "提升", "发展", "技能", "能力", "经验", "知识"] },
    Theme { title: "生活方式", keywords: &["生活", "健康", "习惯", "时间", "效率", "平衡", "休息", "运动"] },
    Theme { title: "人际关系", keywords: &["关系", "沟通", "交流", "团队", "合作", "领导", "管理", "社交"] },
    Theme { title: "创作表达", keywords: &["创作", "写作", "表达", "文章", "内容", "设计", "艺术", "创意"] },
    Theme { title: "投资理财", keywords: &["投资", "理财", "金钱", "财务", "收入", "支出", "储蓄", "资产"] },
    Theme { title: "问题解决", keywords: &["问题", "解决", "方法", "策略", "思考", "分析", "决策", "选择"] },
    Theme { title: "趋势观察", keywords: &["趋势", "变化", "未来", "发展", "观察", "预测", "机会", "挑战"] },
    Theme { title: "工具资源", keywords: &["工具", "资源", "平台", "应用", "软件", "服务", "推荐", "使用"] },
];

const GENERIC: [(&str, &str); 3] = [("general", "核心内容"), ("details", "详细说明"), ("examples", "实例分析")];

/// Categories declared by the fixed policy, in priority order.
pub fn fixed_categories() -> Vec<CategoryDef> {
    SECTIONS
        .iter()
        .map(|s| CategoryDef {
            id: s.id.to_string(),
            title: s.title.to_string(),
            keywords: s.keywords,
            description: Description::Blurb(s.blurb),
        })
        .collect()
}

/// Pick the active themes for the dynamic policy by scoring every theme
/// against the whole text.
pub fn select_themes(lines: &[String]) -> Vec<CategoryDef> {
    let all_text = lines.join(" ").to_lowercase();

    let mut scored: Vec<(usize, &Theme)> = THEMES
        .iter()
        .map(|t| {
            let score = t.keywords.iter().map(|kw| all_text.matches(kw).count()).sum();
            (score, t)
        })
        .collect();
    // stable: equal scores keep declaration order
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let positive = scored.iter().filter(|(score, _)| *score > 0).count();
    if positive == 0 {
        debug!("No theme keywords found, using generic categories");
        return generic_categories();
    }

    let take = positive.clamp(MIN_THEMES, MAX_THEMES);
    scored
        .into_iter()
        .take(take)
        .enumerate()
        .map(|(i, (score, theme))| {
            debug!("Theme {} selected as category_{} (score {})", theme.title, i, score);
            CategoryDef {
                id: format!("category_{i}"),
                title: theme.title.to_string(),
                keywords: theme.keywords,
                description: Description::Related,
            }
        })
        .collect()
}

fn generic_categories() -> Vec<CategoryDef> {
    GENERIC
        .iter()
        .map(|(id, title)| CategoryDef {
            id: id.to_string(),
            title: title.to_string(),
            keywords: &[],
            description: Description::Related,
        })
        .collect()
}

/// Assign every line to a category. Ids are 1-based in line order.
pub fn categorize(lines: &[String], policy: Policy, rng: &mut dyn RandomSource) -> Result<Categorized> {
    let categories = match policy {
        Policy::Fixed => fixed_categories(),
        Policy::Dynamic => select_themes(lines),
    };
    if categories.is_empty() {
        return Err(SiteError::AnalysisFailure("no categories declared".into()));
    }

    let mut items = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        let lower = line.to_lowercase();
        let matched = match policy {
            Policy::Fixed => categories.iter().position(|c| c.matches(&lower)),
            Policy::Dynamic => best_score(&categories, &lower),
        };
        let idx = match matched {
            Some(idx) => idx,
            None => random_index(rng, categories.len())?,
        };
        let id = u32::try_from(i + 1)
            .map_err(|_| SiteError::AnalysisFailure(format!("too many lines ({})", lines.len())))?;
        items.push(ContentItem {
            id,
            category: categories[idx].id.clone(),
            content: line.clone(),
        });
    }

    Ok(Categorized { categories, items })
}

/// Index of the highest-scoring category; the first one wins a tie.
/// `None` when nothing scores.
fn best_score(categories: &[CategoryDef], lower: &str) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (idx, cat) in categories.iter().enumerate() {
        let score = cat.score(lower);
        if score > best.map_or(0, |(_, s)| s) {
            best = Some((idx, score));
        }
    }
    best.map(|(idx, _)| idx)
}

fn random_index(rng: &mut dyn RandomSource, len: usize) -> Result<usize> {
    let idx = rng.pick(len);
    if idx >= len {
        return Err(SiteError::AnalysisFailure(format!(
            "random source returned {idx} for {len} categories"
        )));
    }
    Ok(idx)
}
