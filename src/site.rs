use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One categorized line of source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: u32,
    pub category: String,
    pub content: String,
}

impl ContentItem {
    /// Display label for the id, zero-padded to three digits ("007").
    pub fn label(&self) -> String {
        format!("{:03}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub title: String,
    pub description: String,
    pub count: usize,
}

/// Complete output of one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub source: String,
    pub categories: Vec<Category>,
    pub content: Vec<ContentItem>,
    pub generated_at: DateTime<Utc>,
}

impl SiteData {
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Items of one category in id order.
    pub fn items_in<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a ContentItem> + 'a {
        self.content.iter().filter(move |item| item.category == category)
    }

    pub fn stats(&self) -> SiteStats {
        let total_items = self.content.len();
        let total_chars: usize = self.content.iter().map(|i| i.content.chars().count()).sum();
        let average_chars = if total_items == 0 {
            0
        } else {
            (total_chars as f64 / total_items as f64).round() as usize
        };

        SiteStats {
            total_items,
            category_count: self.categories.len(),
            largest_category: self.categories.iter().map(|c| c.count).max().unwrap_or(0),
            average_chars,
        }
    }
}

/// Summary figures shown above the category grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteStats {
    pub total_items: usize,
    pub category_count: usize,
    pub largest_category: usize,
    pub average_chars: usize,
}
