mod clock;
mod config;
mod error;
mod ingest;
mod pipeline;
mod render;
mod site;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::warn;

use clock::SystemClock;
use config::{Config, FilterChoice, PolicyChoice};
use ingest::{Extraction, Ingested, Input};
use pipeline::categorize::SeededRandom;
use pipeline::{Options, SiteMeta};
use render::{bundle, file_name_for, page, write_atomic, Variant};
use site::SiteData;

#[derive(Parser)]
#[command(name = "text2site", about = "Turn book notes into a categorized knowledge site")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a single self-contained HTML page
    Generate {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        meta: MetaArgs,
        #[command(flatten)]
        run: RunArgs,
        /// Output directory (default: config output_dir, else current dir)
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[arg(long, value_enum)]
        variant: Option<Variant>,
        /// Also write the site data as {title}.json
        #[arg(long)]
        json: bool,
    },
    /// Export a site directory (index.html, style.css, script.js, data.json)
    Export {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        meta: MetaArgs,
        #[command(flatten)]
        run: RunArgs,
        /// Target directory, created if missing
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Show stats and categories without writing anything
    Preview {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        meta: MetaArgs,
        #[command(flatten)]
        run: RunArgs,
        /// List the items of one category (e.g. "money")
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Generate one HTML page per input file, in parallel
    Batch {
        /// .txt or .pdf files
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[command(flatten)]
        run: RunArgs,
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[arg(long, value_enum)]
        variant: Option<Variant>,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct InputArgs {
    /// Text to convert
    #[arg(long)]
    text: Option<String>,
    /// A .txt or .pdf file
    #[arg(short, long)]
    file: Option<PathBuf>,
    /// Web page to fetch (needs a backend service)
    #[arg(long)]
    url: Option<String>,
}

impl InputArgs {
    fn into_input(self) -> Input {
        match (self.text, self.file, self.url) {
            (Some(text), _, _) => Input::Text(text),
            (_, Some(path), _) => Input::File(path),
            (_, _, Some(url)) => Input::Url(url),
            // clap enforces exactly one
            (None, None, None) => Input::Text(String::new()),
        }
    }
}

#[derive(Args)]
struct MetaArgs {
    /// Site title (default: derived from the input)
    #[arg(long)]
    title: Option<String>,
    /// Site description (default: derived from the input)
    #[arg(long)]
    description: Option<String>,
}

#[derive(Args)]
struct RunArgs {
    #[arg(long, value_enum)]
    policy: Option<PolicyChoice>,
    #[arg(long, value_enum)]
    filter: Option<FilterChoice>,
    /// Seed for lines that match no category (default: random)
    #[arg(long)]
    seed: Option<u64>,
    /// Path to text2site.toml (default: searched from the current dir up)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl RunArgs {
    fn load_config(&self) -> anyhow::Result<Config> {
        let config = Config::load(self.config.as_deref())?;
        if let Some(path) = &config.config_path {
            tracing::debug!("Using config {}", path.display());
        }
        Ok(config)
    }
}

/// CLI flags merged over the config file.
struct Settings {
    config: Config,
    policy: PolicyChoice,
    filter: FilterChoice,
    seed: Option<u64>,
}

impl Settings {
    fn new(run: &RunArgs) -> anyhow::Result<Self> {
        let config = run.load_config()?;
        Ok(Settings {
            policy: run.policy.unwrap_or(config.generate.policy),
            filter: run.filter.unwrap_or(config.generate.filter),
            seed: run.seed.or(config.generate.seed),
            config,
        })
    }

    fn build(
        &self,
        ingested: &Ingested,
        title: Option<&str>,
        description: Option<&str>,
        seed: Option<u64>,
    ) -> error::Result<SiteData> {
        let options = Options::resolve(ingested.format, self.policy, self.filter);
        let meta = SiteMeta::derive(
            ingested,
            title.or(self.config.site.title.as_deref()),
            description.or(self.config.site.description.as_deref()),
        );
        let mut rng = match seed {
            Some(seed) => SeededRandom::new(seed),
            None => SeededRandom::from_entropy(),
        };
        pipeline::generate(&ingested.text, meta, &options, &mut rng, &SystemClock)
    }

    fn output_dir(&self, out: Option<PathBuf>) -> PathBuf {
        out.unwrap_or_else(|| self.config.generate.output_dir.clone())
    }
}

async fn load_single(
    input: InputArgs,
    meta: &MetaArgs,
    settings: &Settings,
) -> anyhow::Result<(Ingested, SiteData)> {
    let ingested = ingest::ingest(&input.into_input()).await?;
    let site = settings
        .build(&ingested, meta.title.as_deref(), meta.description.as_deref(), settings.seed)
        .with_context(|| format!("failed to generate site from {}", ingested.source))?;
    Ok((ingested, site))
}

fn placeholder_notice(ingested: &Ingested) {
    if ingested.extraction == Extraction::Placeholder {
        println!(
            "Note: {} was not parsed; the content is generated from its file name.",
            ingested.source
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate { input, meta, run, out, variant, json } => {
            let settings = Settings::new(&run)?;
            let (ingested, site) = load_single(input, &meta, &settings).await?;
            let dir = settings.output_dir(out);
            let variant = variant.unwrap_or(settings.config.generate.variant);

            let html = page::render_page(&site, variant, &settings.config.generate.stylesheet)?;
            let path = dir.join(file_name_for(&site.title, "html"));
            write_atomic(&path, &html).context("failed to save page")?;
            println!(
                "Wrote {} ({} items in {} categories)",
                path.display(),
                site.content.len(),
                site.categories.len()
            );

            if json {
                let path = dir.join(file_name_for(&site.title, "json"));
                write_atomic(&path, &serde_json::to_string_pretty(&site)?)
                    .context("failed to save site data")?;
                println!("Wrote {}", path.display());
            }
            placeholder_notice(&ingested);
            Ok(())
        }
        Commands::Export { input, meta, run, out } => {
            let settings = Settings::new(&run)?;
            let (ingested, site) = load_single(input, &meta, &settings).await?;
            let files = bundle::write_bundle(&site, &out, &settings.config.generate.stylesheet)
                .with_context(|| format!("failed to export to {}", out.display()))?;
            println!("Exported {} files to {}", files.len(), out.display());
            for f in &files {
                println!("  {}", f.display());
            }
            placeholder_notice(&ingested);
            Ok(())
        }
        Commands::Preview { input, meta, run, category } => {
            let settings = Settings::new(&run)?;
            let (ingested, site) = load_single(input, &meta, &settings).await?;
            match category {
                Some(id) => print_category(&site, &id)?,
                None => print_overview(&site),
            }
            placeholder_notice(&ingested);
            Ok(())
        }
        Commands::Batch { files, run, out, variant } => {
            let settings = Settings::new(&run)?;
            let dir = settings.output_dir(out);
            let variant = variant.unwrap_or(settings.config.generate.variant);
            let summary = run_batch(&settings, &files, &dir, variant).await?;
            if summary.written.is_empty() {
                anyhow::bail!("no site was generated ({} files failed)", summary.failed.len());
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn print_overview(site: &SiteData) {
    let stats = site.stats();
    println!("{}", site.title);
    println!("{}", site.description);
    println!("来源: {} | 生成时间: {}", site.source, site.generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!();
    println!("Items:      {}", stats.total_items);
    println!("Categories: {}", stats.category_count);
    println!("Largest:    {}", stats.largest_category);
    println!("Avg chars:  {}", stats.average_chars);
    println!();

    println!(
        "{:>3} | {:<12} | {:<12} | {:>5} | {:<40}",
        "#", "Id", "Title", "Items", "Description"
    );
    println!("{}", "-".repeat(84));
    for (i, c) in site.categories.iter().enumerate() {
        println!(
            "{:>3} | {:<12} | {:<12} | {:>5} | {:<40}",
            i + 1,
            truncate(&c.id, 12),
            truncate(&c.title, 12),
            c.count,
            truncate(&c.description, 40)
        );
    }

    println!("\n{} items | details: preview --category <id>", site.content.len());
}

fn print_category(site: &SiteData, id: &str) -> anyhow::Result<()> {
    let Some(category) = site.category(id) else {
        let known: Vec<&str> = site.categories.iter().map(|c| c.id.as_str()).collect();
        anyhow::bail!("unknown category '{}' (available: {})", id, known.join(", "));
    };

    println!("{} ({})", category.title, category.description);
    println!("{}", "-".repeat(60));
    for item in site.items_in(id) {
        println!("{}  {}", item.label(), truncate(&item.content, 80));
    }
    Ok(())
}

/// Outcome of a batch run, in input order.
struct BatchSummary {
    written: Vec<PathBuf>,
    failed: Vec<(PathBuf, String)>,
}

/// `{stem}.html` for each input. Repeated stems get `-2`, `-3`, ... so no two
/// inputs share an output file; names are compared case-insensitively.
fn batch_file_names<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Vec<String> {
    let mut taken = HashSet::new();
    paths
        .into_iter()
        .map(|path| {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let mut name = file_name_for(&stem, "html");
            let mut n = 2;
            while !taken.insert(name.to_lowercase()) {
                name = file_name_for(&format!("{stem}-{n}"), "html");
                n += 1;
            }
            name
        })
        .collect()
}

async fn run_batch(
    settings: &Settings,
    files: &[PathBuf],
    dir: &Path,
    variant: Variant,
) -> anyhow::Result<BatchSummary> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    // Phase 1: read every file
    let mut inputs = Vec::with_capacity(files.len());
    let mut failed = Vec::new();
    for (index, path) in files.iter().enumerate() {
        match ingest::ingest(&Input::File(path.clone())).await {
            Ok(ingested) => inputs.push((index, path, ingested)),
            Err(e) => failed.push((path.clone(), e.to_string())),
        }
    }
    if inputs.is_empty() {
        for (path, reason) in &failed {
            println!("  {}: {}", path.display(), reason);
        }
        anyhow::bail!("none of the {} files could be read", files.len());
    }
    let names = batch_file_names(inputs.iter().map(|(_, path, _)| path.as_path()));

    // Phase 2: generate + render in parallel
    println!("Generating {} sites...", inputs.len());
    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let stylesheet = settings.config.generate.stylesheet.as_str();
    let results: Vec<_> = inputs
        .par_iter()
        .zip(&names)
        .map(|((index, path, ingested), name)| {
            let seed = settings.seed.map(|s| s.wrapping_add(*index as u64));
            let outcome = settings
                .build(ingested, None, None, seed)
                .and_then(|site| {
                    let html = page::render_page(&site, variant, stylesheet)?;
                    let target = dir.join(name);
                    write_atomic(&target, &html)?;
                    Ok((target, site.content.len()))
                });
            pb.inc(1);
            (*path, outcome)
        })
        .collect();
    pb.finish_and_clear();

    let mut written = Vec::new();
    for (path, outcome) in results {
        match outcome {
            Ok((target, items)) => {
                println!("  {} -> {} ({} items)", path.display(), target.display(), items);
                written.push(target);
            }
            Err(e) => {
                warn!("{}: {}", path.display(), e);
                failed.push((path.clone(), e.to_string()));
            }
        }
    }

    if !failed.is_empty() {
        println!("\n--- Failed ---");
        for (path, reason) in &failed {
            println!("  {}: {}", truncate(&path.display().to_string(), 40), reason);
        }
    }
    println!("\n{} written, {} failed", written.len(), failed.len());
    Ok(BatchSummary { written, failed })
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("赚钱篇", 12), "赚钱篇");
        assert_eq!(truncate("一人企业复利商业化", 4), "一人企业...");
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5s");
    }

    #[test]
    fn cli_requires_exactly_one_input() {
        assert!(Cli::try_parse_from(["text2site", "preview"]).is_err());
        assert!(Cli::try_parse_from(["text2site", "preview", "--text", "a", "--url", "b"]).is_err());
        assert!(Cli::try_parse_from(["text2site", "preview", "--file", "notes.txt"]).is_ok());
    }

    #[test]
    fn batch_needs_files() {
        assert!(Cli::try_parse_from(["text2site", "batch"]).is_err());
        let cli = Cli::try_parse_from(["text2site", "batch", "a.txt", "b.pdf", "--seed", "7"]).unwrap();
        match cli.command {
            Commands::Batch { files, run, .. } => {
                assert_eq!(files.len(), 2);
                assert_eq!(run.seed, Some(7));
            }
            _ => panic!("expected batch"),
        }
    }

    #[tokio::test]
    async fn generate_from_text_with_flags_over_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(config::CONFIG_FILENAME);
        std::fs::write(&config_path, "[site]\ntitle = \"配置标题\"\n\n[generate]\npolicy = \"dynamic\"\n").unwrap();

        let run = RunArgs {
            policy: Some(PolicyChoice::Fixed),
            filter: None,
            seed: Some(1),
            config: Some(config_path),
        };
        let settings = Settings::new(&run).unwrap();
        let input = InputArgs {
            text: Some("笔记标题\n001 如何通过写作赚钱\n002 这是一个陷阱警告".into()),
            file: None,
            url: None,
        };
        let meta = MetaArgs { title: None, description: None };
        let (ingested, site) = load_single(input, &meta, &settings).await.unwrap();

        assert_eq!(ingested.extraction, Extraction::Verbatim);
        assert_eq!(site.title, "配置标题");
        // --policy fixed beats the config's dynamic
        assert!(site.category("money").is_some());
        assert_eq!(site.content.len(), 2);
    }

    #[test]
    fn batch_names_are_unique() {
        let paths = [
            PathBuf::from("a/notes.txt"),
            PathBuf::from("b/notes.txt"),
            PathBuf::from("Notes.pdf"),
            PathBuf::from("notes-2.txt"),
            PathBuf::from("营销手册.pdf"),
        ];
        let names = batch_file_names(paths.iter().map(PathBuf::as_path));
        assert_eq!(
            names,
            vec!["notes.html", "notes-2.html", "Notes-3.html", "notes-2-2.html", "营销手册.html"]
        );
    }

    #[tokio::test]
    async fn batch_writes_one_page_per_input_even_with_shared_stems() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = Vec::new();
        for (sub, text) in [("a", "第一份笔记：如何通过写作赚钱"), ("b", "第二份笔记：这是一个陷阱警告")] {
            std::fs::create_dir_all(dir.path().join(sub)).unwrap();
            let path = dir.path().join(sub).join("notes.txt");
            std::fs::write(&path, text).unwrap();
            files.push(path);
        }
        let pdf = dir.path().join("notes.pdf");
        std::fs::write(&pdf, b"%PDF-1.4").unwrap();
        files.push(pdf);
        files.push(dir.path().join("missing.txt"));

        let config_path = dir.path().join(config::CONFIG_FILENAME);
        std::fs::write(&config_path, "").unwrap();
        let run = RunArgs { policy: None, filter: None, seed: Some(3), config: Some(config_path) };
        let settings = Settings::new(&run).unwrap();

        let out = dir.path().join("out");
        let summary = run_batch(&settings, &files, &out, Variant::Static).await.unwrap();

        assert_eq!(
            summary.written,
            vec![out.join("notes.html"), out.join("notes-2.html"), out.join("notes-3.html")]
        );
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, files[3]);

        let first = std::fs::read_to_string(out.join("notes.html")).unwrap();
        let second = std::fs::read_to_string(out.join("notes-2.html")).unwrap();
        let third = std::fs::read_to_string(out.join("notes-3.html")).unwrap();
        assert!(first.contains("第一份笔记"));
        assert!(second.contains("第二份笔记"));
        assert!(third.contains("notes的核心概念和基础知识"));
    }
}
