//! Multi-file site directory: `index.html`, `style.css`, `script.js` and
//! `data.json`, ready to be served as static files.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::site::SiteData;

use super::{escape, write_atomic};

pub const INDEX_HTML: &str = "index.html";
pub const STYLE_CSS: &str = "style.css";
pub const SCRIPT_JS: &str = "script.js";
pub const DATA_JSON: &str = "data.json";

const STYLE: &str = r#".category-card {
    transition: transform 0.2s ease-in-out, box-shadow 0.2s ease-in-out;
}

.category-card:hover {
    transform: translateY(-2px);
    box-shadow: 0 10px 25px rgba(0, 0, 0, 0.1);
}

.content-card {
    transition: transform 0.2s ease-in-out;
}

.content-card:hover {
    transform: scale(1.02);
}

.cat-money { background: #f0fdf4; border-color: #bbf7d0; }
.cat-pitfalls { background: #fef2f2; border-color: #fecaca; }
.cat-writing { background: #eff6ff; border-color: #bfdbfe; }
.cat-growth { background: #faf5ff; border-color: #e9d5ff; }

.hidden { display: none; }

.fade-in {
    animation: fadeIn 0.5s ease-in-out;
}

@keyframes fadeIn {
    from { opacity: 0; transform: translateY(20px); }
    to { opacity: 1; transform: translateY(0); }
}
"#;

const SCRIPT_BODY: &str = r#"
const categoryIcons = { money: '💰', pitfalls: '⚠️', writing: '✍️', growth: '📈' };

const categoriesContainer = document.getElementById('categories');
const contentArea = document.getElementById('content-area');
const contentList = document.getElementById('content-list');
const backBtn = document.getElementById('back-btn');

function element(tag, className, text) {
    const el = document.createElement(tag);
    if (className) el.className = className;
    if (text !== undefined) el.textContent = text;
    return el;
}

function renderCategories() {
    categoriesContainer.replaceChildren(...websiteData.categories.map(category => {
        const card = element('div', 'category-card border rounded-lg p-6 cursor-pointer cat-' + category.id);
        card.dataset.category = category.id;
        card.append(
            element('div', 'text-4xl mb-4', categoryIcons[category.id] || '📄'),
            element('h3', 'text-xl font-bold mb-2', category.title),
            element('p', 'text-gray-600 text-sm', category.description),
        );
        card.addEventListener('click', () => showCategoryContent(category.id));
        return card;
    }));
}

function showCategoryContent(categoryId) {
    const items = websiteData.content.filter(item => item.category === categoryId);
    categoriesContainer.parentElement.classList.add('hidden');
    contentArea.classList.remove('hidden');
    contentArea.classList.add('fade-in');
    contentList.replaceChildren(...items.map(item => {
        const card = element('div', 'content-card bg-white border rounded-lg p-6 shadow-sm');
        card.append(
            element('span', 'font-bold text-blue-600', String(item.id).padStart(3, '0')),
            element('p', 'text-gray-800 leading-relaxed whitespace-pre-line', item.content),
        );
        return card;
    }));
}

function goBack() {
    contentArea.classList.add('hidden');
    categoriesContainer.parentElement.classList.remove('hidden');
}

backBtn.addEventListener('click', goBack);
document.addEventListener('DOMContentLoaded', renderCategories);
"#;

/// Write the four bundle files into `dir`, creating it if needed.
/// Returns the written paths in a fixed order.
pub fn write_bundle(site: &SiteData, dir: &Path, stylesheet: &str) -> Result<Vec<PathBuf>> {
    let files = [
        (INDEX_HTML, index_html(site, stylesheet)),
        (STYLE_CSS, STYLE.to_string()),
        (SCRIPT_JS, script_js(site)?),
        (DATA_JSON, serde_json::to_string_pretty(site)?),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (name, contents) in files {
        let path = dir.join(name);
        write_atomic(&path, &contents)?;
        debug!("wrote {} ({} bytes)", path.display(), contents.len());
        written.push(path);
    }
    Ok(written)
}

fn index_html(site: &SiteData, stylesheet: &str) -> String {
    let mut html = String::with_capacity(2048);
    html.push_str("<!DOCTYPE html>\n<html lang=\"zh-CN\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape(&site.title));
    let _ = writeln!(html, "<link rel=\"stylesheet\" href=\"{STYLE_CSS}\">");
    let _ = writeln!(html, "<link rel=\"stylesheet\" href=\"{}\">", escape(stylesheet));
    html.push_str("</head>\n<body>\n<div id=\"app\">\n");

    html.push_str("<header class=\"bg-white shadow-sm border-b\">\n");
    let _ = writeln!(html, "<h1 class=\"text-2xl font-bold text-blue-600\">{}</h1>", escape(&site.title));
    let _ = writeln!(html, "<p class=\"text-gray-600 mt-2\">{}</p>", escape(&site.description));
    html.push_str("</header>\n");

    html.push_str("<main class=\"container mx-auto px-4 py-8\">\n");
    html.push_str("<div class=\"mb-8\">\n<div id=\"categories\" class=\"grid grid-cols-1 md:grid-cols-2 lg:grid-cols-4 gap-6\"></div>\n</div>\n");
    html.push_str("<div id=\"content-area\" class=\"hidden\">\n");
    html.push_str("<button id=\"back-btn\" class=\"text-blue-600 hover:text-blue-800 mb-6\">返回首页</button>\n");
    html.push_str("<div id=\"content-list\" class=\"grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-6\"></div>\n");
    html.push_str("</div>\n</main>\n");

    html.push_str("<footer class=\"bg-gray-50 border-t py-8 mt-16 text-center\">\n");
    let _ = writeln!(
        html,
        "<p class=\"text-gray-600\">生成时间: {}</p>",
        site.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(html, "<p class=\"text-sm text-gray-500 mt-2\">来源: {}</p>", escape(&site.source));
    html.push_str("</footer>\n</div>\n");
    let _ = writeln!(html, "<script src=\"{SCRIPT_JS}\"></script>");
    html.push_str("</body>\n</html>\n");
    html
}

fn script_js(site: &SiteData) -> Result<String> {
    let data = serde_json::to_string_pretty(site)?;
    Ok(format!("const websiteData = {data};\n{SCRIPT_BODY}"))
}
