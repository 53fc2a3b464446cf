use std::collections::{HashMap, HashSet};

use crate::error::{Result, SiteError};
use crate::site::{Category, ContentItem};

use super::categorize::CategoryDef;

/// Count items per declared category. Every declared category is returned,
/// including empty ones.
pub fn aggregate(defs: &[CategoryDef], items: &[ContentItem]) -> Vec<Category> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for item in items {
        *counts.entry(item.category.as_str()).or_default() += 1;
    }

    defs.iter()
        .map(|def| {
            let count = counts.get(def.id.as_str()).copied().unwrap_or(0);
            Category {
                id: def.id.clone(),
                title: def.title.clone(),
                description: def.describe(count),
                count,
            }
        })
        .collect()
}

/// Check the invariants that tie items to categories.
pub fn validate(categories: &[Category], items: &[ContentItem]) -> Result<()> {
    let declared: HashSet<&str> = categories.iter().map(|c| c.id.as_str()).collect();
    if declared.len() != categories.len() {
        return Err(SiteError::AnalysisFailure("duplicate category id".into()));
    }

    for (i, item) in items.iter().enumerate() {
        if !declared.contains(item.category.as_str()) {
            return Err(SiteError::AnalysisFailure(format!(
                "item {} assigned to undeclared category {}",
                item.id, item.category
            )));
        }
        if item.id as usize != i + 1 {
            return Err(SiteError::AnalysisFailure(format!(
                "item at position {} has id {}",
                i + 1,
                item.id
            )));
        }
    }

    let total: usize = categories.iter().map(|c| c.count).sum();
    if total != items.len() {
        return Err(SiteError::AnalysisFailure(format!(
            "category counts sum to {total}, expected {}",
            items.len()
        )));
    }
    Ok(())
}
