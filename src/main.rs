mod categorize;
mod config;
mod extract;
mod fetch;
mod filter;
mod htmlpage;
mod model;
mod mythos;
mod reconcile;
mod snapshot;
mod wikitext;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::time::sleep;

#[derive(Parser)]
#[command(name = "eldermyth_scraper", about = "Eldermyth wiki scraper and card data extractor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download every wiki page into one categorized snapshot
    Scrape {
        /// Snapshot output path
        #[arg(default_value = "data/eldermyth_data.json")]
        output: PathBuf,
    },
    /// Merge antagonist pages with the meta table into detail records
    Antagonists {
        /// Snapshot produced by `scrape`
        #[arg(default_value = "data/eldermyth_data.json")]
        snapshot: PathBuf,
        /// Detail output path
        #[arg(default_value = "data/antagonists_detailed.json")]
        output: PathBuf,
        /// Hand-maintained meta table
        #[arg(long, default_value = "data/antagonists_meta.json")]
        meta: PathBuf,
    },
    /// Extract investigator detail records
    Investigators {
        #[arg(default_value = "data/eldermyth_data.json")]
        snapshot: PathBuf,
        #[arg(default_value = "data/investigators_detailed.json")]
        output: PathBuf,
    },
    /// Attach research encounter and mystery details to the antagonist file
    Enrich {
        #[arg(default_value = "data/eldermyth_data.json")]
        snapshot: PathBuf,
        /// Detail file rewritten in place
        #[arg(default_value = "data/antagonists_detailed.json")]
        detailed: PathBuf,
    },
    /// Extract mythos cards into a standalone document
    Mythos {
        #[arg(default_value = "data/eldermyth_data.json")]
        snapshot: PathBuf,
        #[arg(default_value = "data/mythos_cards.json")]
        output: PathBuf,
    },
    /// Cut the mythos document down to Core Game and Forsaken Lore
    FilterMythos {
        /// Mythos document rewritten in place
        #[arg(default_value = "data/mythos_cards.json")]
        path: PathBuf,
    },
    /// Scrape the rendered encounter reference pages
    Encounters {
        /// Output directory, one JSON document per page
        #[arg(default_value = "data/scraped_encounters")]
        output: PathBuf,
    },
    /// Filter scraped encounter documents down to the allowed sets
    FilterEncounters {
        #[arg(default_value = "data/scraped_encounters")]
        input: PathBuf,
        #[arg(default_value = "data/scraped_encounters_filtered")]
        output: PathBuf,
    },
    /// Scrape the per-antagonist research pages into one document
    Research {
        /// Directory receiving research-encounter.json
        #[arg(default_value = "data/scraped_encounters_filtered")]
        output: PathBuf,
    },
    /// Scrape the other world location pages into one document
    Otherworld {
        /// Directory receiving other-world-encounters.json
        #[arg(default_value = "data/scraped_encounters_filtered")]
        output: PathBuf,
    },
    /// Show snapshot statistics
    Stats {
        #[arg(default_value = "data/eldermyth_data.json")]
        snapshot: PathBuf,
    },
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
        Commands::Scrape { output } => run_scrape(&output).await,
        Commands::Antagonists { snapshot, output, meta } => {
            run_antagonists(&snapshot, &meta, &output)
        }
        Commands::Investigators { snapshot, output } => run_investigators(&snapshot, &output),
        Commands::Enrich { snapshot, detailed } => run_enrich(&snapshot, &detailed),
        Commands::Mythos { snapshot, output } => run_mythos(&snapshot, &output),
        Commands::FilterMythos { path } => run_filter_mythos(&path),
        Commands::Encounters { output } => run_encounters(&output).await,
        Commands::FilterEncounters { input, output } => run_filter_encounters(&input, &output),
        Commands::Research { output } => run_research(&output).await,
        Commands::Otherworld { output } => run_otherworld(&output).await,
        Commands::Stats { snapshot } => run_stats(&snapshot),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

async fn run_scrape(output: &Path) -> Result<()> {
    let base = config::wiki_base();
    let client = fetch::client()?;
    println!("Scraping {base} ...");
    let snap = fetch::scrape_snapshot(&client, &base).await?;
    snapshot::save_snapshot(output, &snap)?;
    println!("Saved {} pages to {}", snap.metadata.total_pages, output.display());
    print_stats(&snap);
    Ok(())
}

fn run_antagonists(snapshot_path: &Path, meta_path: &Path, output: &Path) -> Result<()> {
    let snap = snapshot::load_snapshot(snapshot_path)?;
    let meta: Vec<model::AntagonistMeta> = if meta_path.exists() {
        snapshot::read_json(meta_path)?
    } else {
        println!("No meta table at {}, using defaults", meta_path.display());
        Vec::new()
    };
    let (details, counts) = reconcile::build_antagonist_details(&snap, &meta);
    snapshot::write_json_atomic(output, &details)?;
    counts.print();
    println!("Wrote {}", output.display());
    Ok(())
}

fn run_investigators(snapshot_path: &Path, output: &Path) -> Result<()> {
    let snap = snapshot::load_snapshot(snapshot_path)?;
    let defeated_rows = snap
        .all_pages
        .get("Defeated")
        .map(extract::investigators::parse_defeated_table)
        .unwrap_or_default();
    if !defeated_rows.is_empty() {
        println!("Matching against {} defeated table rows", defeated_rows.len());
    }
    let mut details: Vec<model::InvestigatorDetail> = snap
        .categories
        .investigators
        .iter()
        .map(|page| extract::investigators::investigator_detail(page, &defeated_rows))
        .collect();
    details.sort_by(|a, b| a.name.cmp(&b.name));
    snapshot::write_json_atomic(output, &details)?;
    println!("Wrote {} investigators to {}", details.len(), output.display());
    Ok(())
}

fn run_enrich(snapshot_path: &Path, detailed: &Path) -> Result<()> {
    let snap = snapshot::load_snapshot(snapshot_path)?;
    let mut details: Vec<model::AntagonistDetail> = snapshot::read_json(detailed)?;
    let counts = reconcile::enrich_details(&mut details, &snap);
    snapshot::write_json_atomic(detailed, &details)?;
    counts.print();
    Ok(())
}

fn run_mythos(snapshot_path: &Path, output: &Path) -> Result<()> {
    let snap = snapshot::load_snapshot(snapshot_path)?;
    let source = snapshot_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| snapshot_path.display().to_string());
    let (doc, summary) = mythos::extract_mythos(&snap, &source);
    snapshot::write_json_atomic(output, &doc)?;
    summary.print();
    println!("Wrote {}", output.display());
    Ok(())
}

fn run_filter_mythos(path: &Path) -> Result<()> {
    let mut doc: model::MythosDocument = snapshot::read_json(path)?;
    println!("Filtering {} ...", path.display());
    let counts = mythos::filter_mythos(&mut doc);
    snapshot::write_json_atomic(path, &doc)?;
    counts.print();
    Ok(())
}

async fn run_encounters(output_dir: &Path) -> Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};

    let base = config::wiki_base();
    let client = fetch::client()?;

    let pb = ProgressBar::new(config::ENCOUNTER_PAGES.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
            .unwrap()
            .progress_chars("#>-"),
    );
    let mut pages = indexmap::IndexMap::new();
    for page in config::ENCOUNTER_PAGES {
        let url = config::page_url(&base, page);
        let html = fetch::fetch_html(&client, &url).await?;
        let doc = htmlpage::parse_encounter_document(&html, &url, page);
        let slug = config::page_slug(page);
        let file = format!("{slug}.json");
        snapshot::write_json_atomic(&output_dir.join(&file), &doc)?;
        pages.insert(
            slug,
            model::EncounterPageSummary {
                file,
                title: doc.title.clone(),
                encounter_count: doc.all_encounters.as_ref().map_or(0, Vec::len),
                list_count: doc.all_list_items.as_ref().map_or(0, Vec::len),
                section_count: doc.sections.as_ref().map_or(0, |sections| sections.len()),
            },
        );
        pb.inc(1);
        sleep(config::REQUEST_DELAY).await;
    }
    pb.finish_and_clear();
    let summary = model::EncounterScrapeSummary {
        scraped_at: snapshot::now_iso(),
        total_pages: pages.len(),
        pages,
    };
    snapshot::write_json_atomic(&output_dir.join("_summary.json"), &summary)?;
    println!(
        "Scraped {} encounter pages into {}",
        config::ENCOUNTER_PAGES.len(),
        output_dir.display()
    );
    Ok(())
}

fn run_filter_encounters(input: &Path, output: &Path) -> Result<()> {
    println!("Filtering {} -> {}", input.display(), output.display());
    let stats = filter::filter_encounter_dir(input, output)?;
    for (name, counts) in &stats.files {
        println!("  {:<40} {} -> {}", name, counts.before, counts.after);
    }
    println!(
        "Total: {} -> {} encounters ({} removed)",
        stats.totals.before, stats.totals.after, stats.totals.removed
    );
    Ok(())
}

async fn run_research(output_dir: &Path) -> Result<()> {
    let base = config::wiki_base();
    let client = fetch::client()?;
    let mut entries = Vec::new();
    for research in config::RESEARCH_PAGES {
        let url = config::page_url(&base, research.page);
        let html = fetch::fetch_html(&client, &url).await?;
        let encounters =
            htmlpage::parse_research_page(&html, research.antagonist, research.set_text);
        println!(
            "  {:<16} {} city / {} wilderness / {} sea",
            research.antagonist,
            encounters.city.len(),
            encounters.wilderness.len(),
            encounters.sea.len()
        );
        entries.push(model::AntagonistResearch {
            antagonist: research.antagonist.to_string(),
            url,
            set: model::SetRef {
                text: research.set_text.to_string(),
                expansion: research.expansion.to_string(),
            },
            encounters,
        });
        sleep(config::REQUEST_DELAY).await;
    }
    let doc = htmlpage::build_research_document(&base, entries);
    let path = output_dir.join("research-encounter.json");
    snapshot::write_json_atomic(&path, &doc)?;
    println!(
        "Wrote {} research encounters to {}",
        doc.all_encounters.len(),
        path.display()
    );
    Ok(())
}

async fn run_otherworld(output_dir: &Path) -> Result<()> {
    let base = config::wiki_base();
    let client = fetch::client()?;
    let mut locations = Vec::new();
    for page in config::OTHER_WORLD_PAGES {
        let url = config::page_url(&base, page);
        let html = fetch::fetch_html(&client, &url).await?;
        let location = htmlpage::parse_other_world_page(&html, &base, page);
        println!(
            "  {:<24} {} encounters",
            location.location,
            location.encounters.len()
        );
        locations.push(location);
        sleep(config::REQUEST_DELAY).await;
    }
    let doc = htmlpage::build_other_world_document(&base, locations);
    let path = output_dir.join("other-world-encounters.json");
    snapshot::write_json_atomic(&path, &doc)?;
    println!(
        "Wrote {} other world encounters to {}",
        doc.all_encounters.len(),
        path.display()
    );
    Ok(())
}

fn run_stats(snapshot_path: &Path) -> Result<()> {
    let snap = snapshot::load_snapshot(snapshot_path)?;
    print_stats(&snap);
    Ok(())
}

fn print_stats(snap: &model::Snapshot) {
    println!("Source:    {}", snap.metadata.source);
    println!("Scraped:   {}", snap.metadata.scraped_at);
    println!("Version:   {}", snap.metadata.version);
    println!("Pages:     {}", snap.metadata.total_pages);
    for (bucket, count) in &snap.metadata.stats {
        println!("  {:<16} {}", bucket, count);
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
