//! Single-file HTML page for a generated site.
//!
//! Everything is inline except one CDN stylesheet, so the saved file opens
//! offline.

use std::fmt::Write;

use crate::error::Result;
use crate::site::{ContentItem, SiteData};

use super::{category_icon, embed_json, escape, Variant};

const STYLE: &str = r#"body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 20px; background: #f5f5f5; }
.container { max-width: 1200px; margin: 0 auto; }
.header { text-align: center; margin-bottom: 40px; padding: 40px; background: white; border-radius: 10px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
.header .meta { color: #6b7280; font-size: 14px; }
.categories { display: grid; grid-template-columns: repeat(auto-fit, minmax(250px, 1fr)); gap: 20px; margin-bottom: 40px; }
.category-card { display: block; color: inherit; text-decoration: none; background: white; padding: 20px; border: 1px solid #e5e7eb; border-radius: 10px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); cursor: pointer; transition: transform 0.2s; }
.category-card:hover { transform: translateY(-2px); }
.category-icon { font-size: 32px; }
.content-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(300px, 1fr)); gap: 20px; }
.content-card { background: white; padding: 20px; border-left: 4px solid #e5e7eb; border-radius: 10px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
.content-id { color: #3b82f6; font-weight: bold; margin-bottom: 10px; }
.cat-money { border-color: #bbf7d0; }
.cat-pitfalls { border-color: #fecaca; }
.cat-writing { border-color: #bfdbfe; }
.cat-growth { border-color: #e9d5ff; }
.back { margin-bottom: 20px; padding: 10px 20px; background: #3b82f6; color: white; border: none; border-radius: 5px; cursor: pointer; }
.hidden { display: none; }
"#;

const SCRIPT: &str = r#"const siteData = JSON.parse(document.getElementById('site-data').textContent);
const contentList = document.getElementById('content-list');

function contentCard(item) {
    const card = document.createElement('article');
    card.className = 'content-card cat-' + item.category;
    card.dataset.category = item.category;
    const label = document.createElement('div');
    label.className = 'content-id';
    label.textContent = String(item.id).padStart(3, '0');
    const text = document.createElement('p');
    text.textContent = item.content;
    card.append(label, text);
    return card;
}

function renderContent(items) {
    contentList.replaceChildren(...items.map(contentCard));
}

function showCategory(categoryId) {
    const category = siteData.categories.find(c => c.id === categoryId);
    renderContent(siteData.content.filter(item => item.category === categoryId));
    document.getElementById('content-title').textContent = category ? category.title : '';
    document.getElementById('categories-view').classList.add('hidden');
    document.getElementById('back-btn').classList.remove('hidden');
}

function showAll() {
    renderContent(siteData.content);
    document.getElementById('content-title').textContent = '全部内容';
    document.getElementById('categories-view').classList.remove('hidden');
    document.getElementById('back-btn').classList.add('hidden');
}
"#;

/// Render a complete standalone HTML document.
pub fn render_page(site: &SiteData, variant: Variant, stylesheet: &str) -> Result<String> {
    let mut html = String::with_capacity(8192 + site.content.len() * 256);

    html.push_str("<!DOCTYPE html>\n<html lang=\"zh-CN\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape(&site.title));
    let _ = writeln!(html, "<link rel=\"stylesheet\" href=\"{}\">", escape(stylesheet));
    let _ = write!(html, "<style>\n{STYLE}</style>\n");
    html.push_str("</head>\n<body>\n<div class=\"container\">\n");

    render_header(&mut html, site);

    match variant {
        Variant::Interactive => {
            render_category_cards(&mut html, site, variant);
            html.push_str("<section id=\"content-view\">\n");
            html.push_str(
                "<button id=\"back-btn\" class=\"back hidden\" onclick=\"showAll()\">返回分类</button>\n",
            );
            html.push_str("<h2 id=\"content-title\">全部内容</h2>\n");
            html.push_str("<div id=\"content-list\" class=\"content-grid\">\n");
            for item in &site.content {
                render_content_card(&mut html, item);
            }
            html.push_str("</div>\n</section>\n");
        }
        Variant::Static => {
            render_category_cards(&mut html, site, variant);
            for category in &site.categories {
                let _ = writeln!(
                    html,
                    "<section class=\"category-section\" id=\"section-{}\">",
                    escape(&category.id)
                );
                let _ = writeln!(
                    html,
                    "<h2>{} {}</h2>",
                    category_icon(&category.id),
                    escape(&category.title)
                );
                html.push_str("<div class=\"content-grid\">\n");
                for item in site.items_in(&category.id) {
                    render_content_card(&mut html, item);
                }
                html.push_str("</div>\n</section>\n");
            }
        }
    }

    html.push_str("</div>\n");

    if variant == Variant::Interactive {
        let _ = writeln!(
            html,
            "<script type=\"application/json\" id=\"site-data\">{}</script>",
            embed_json(site)?
        );
        let _ = write!(html, "<script>\n{SCRIPT}</script>\n");
    }

    html.push_str("</body>\n</html>\n");
    Ok(html)
}

fn render_header(html: &mut String, site: &SiteData) {
    html.push_str("<header class=\"header\">\n");
    let _ = writeln!(html, "<h1>{}</h1>", escape(&site.title));
    let _ = writeln!(html, "<p>{}</p>", escape(&site.description));
    let _ = writeln!(
        html,
        "<p class=\"meta\">来源: {} • 生成时间: {} • 共 {} 条内容</p>",
        escape(&site.source),
        site.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        site.content.len()
    );
    html.push_str("</header>\n");
}

fn render_category_cards(html: &mut String, site: &SiteData, variant: Variant) {
    html.push_str("<section id=\"categories-view\" class=\"categories\">\n");
    for category in &site.categories {
        let id = escape(&category.id);
        match variant {
            Variant::Interactive => {
                let _ = writeln!(
                    html,
                    "<div class=\"category-card cat-{id}\" data-category=\"{id}\" onclick=\"showCategory('{id}')\">"
                );
            }
            Variant::Static => {
                let _ = writeln!(
                    html,
                    "<a class=\"category-card cat-{id}\" data-category=\"{id}\" href=\"#section-{id}\">"
                );
            }
        }
        let _ = writeln!(html, "<div class=\"category-icon\">{}</div>", category_icon(&category.id));
        let _ = writeln!(html, "<h3>{}</h3>", escape(&category.title));
        let _ = writeln!(html, "<p>{}</p>", escape(&category.description));
        html.push_str(match variant {
            Variant::Interactive => "</div>\n",
            Variant::Static => "</a>\n",
        });
    }
    html.push_str("</section>\n");
}

fn render_content_card(html: &mut String, item: &ContentItem) {
    let category = escape(&item.category);
    let _ = writeln!(
        html,
        "<article class=\"content-card cat-{category}\" data-category=\"{category}\">"
    );
    let _ = writeln!(html, "<div class=\"content-id\">{}</div>", item.label());
    let _ = writeln!(html, "<p>{}</p>", escape(&item.content));
    html.push_str("</article>\n");
}
