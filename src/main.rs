use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use signboard_portfolio::{
    sitemap, signed_url, Config, ListOptions, NotionClient, Portfolio, PortfolioItem, SignType,
    ALL_CATEGORIES,
};

#[derive(Parser)]
#[command(name = "portfolio", about = "Signage portfolio data from the Notion database")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify that the content source is configured
    Check,
    /// List visible portfolio items in display order
    List {
        /// Category to filter by (e.g. "LED채널"; "전체" for all)
        #[arg(short = 't', long = "type")]
        filter_type: Option<String>,
        /// Max items to return
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Only items with a completion date
        #[arg(long)]
        completed_only: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show one item by id (hyphenated or not)
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Write sitemap.xml for the site
    Sitemap {
        /// Site base url (default: SITE_URL)
        #[arg(long)]
        base_url: Option<String>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
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
    let config = Config::from_env();
    let missing = config.check();

    let result = match cli.command {
        Commands::Check => {
            if missing.is_empty() {
                println!("Configured: database {}", config.database_id.as_deref().unwrap_or("-"));
                Ok(())
            } else {
                anyhow::bail!("Missing settings: {}", missing.join(", "))
            }
        }
        Commands::List { filter_type, limit, completed_only, json } => {
            if let Some(t) = filter_type.as_deref() {
                if t != ALL_CATEGORIES && t.parse::<SignType>().is_err() {
                    tracing::warn!("'{}' is not a known category; querying anyway", t);
                }
            }
            let portfolio = Portfolio::new(NotionClient::new(config)?);
            let options = ListOptions {
                filter_type,
                page_size: limit,
                only_with_completed_at: completed_only,
            };

            let pb = spinner("Loading portfolio...");
            let items = portfolio.list_all(&options).await;
            pb.finish_and_clear();
            let items = items.context("Listing failed")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else if items.is_empty() {
                println!("No portfolio items.");
            } else {
                print_table(&items);
            }
            Ok(())
        }
        Commands::Show { id, json } => {
            let portfolio = Portfolio::new(NotionClient::new(config)?);

            let pb = spinner("Loading item...");
            let item = portfolio.get_by_id(&id).await;
            pb.finish_and_clear();

            match item.context("Lookup failed")? {
                None => println!("Not found: {}", id),
                Some(item) if json => println!("{}", serde_json::to_string_pretty(&item)?),
                Some(item) => print_detail(&item),
            }
            Ok(())
        }
        Commands::Sitemap { base_url, output } => {
            let base_url = base_url.unwrap_or_else(|| config.site_url.clone());
            let portfolio = Portfolio::new(NotionClient::new(config)?);

            let pb = spinner("Building sitemap...");
            let xml = sitemap::generate(&portfolio, &base_url).await;
            pb.finish_and_clear();
            let xml = xml?;

            match output {
                Some(path) => {
                    std::fs::write(&path, xml)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => println!("{}", xml),
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn spinner(msg: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn print_table(items: &[PortfolioItem]) {
    println!(
        "{:>3} | {:<24} | {:<16} | {:<10} | {:<18} | {:>4} | {:<32}",
        "#", "Title", "Type", "Completed", "Location", "Imgs", "Id"
    );
    println!("{}", "-".repeat(126));

    for (i, item) in items.iter().enumerate() {
        println!(
            "{:>3} | {:<24} | {:<16} | {:<10} | {:<18} | {:>4} | {:<32}",
            i + 1,
            truncate(&item.title, 24),
            truncate(item.kind.as_deref().unwrap_or("-"), 16),
            item.completed_at.as_deref().unwrap_or("-"),
            truncate(item.location.as_deref().unwrap_or("-"), 18),
            item.all_image_urls().count(),
            signboard_portfolio::canonical_id(&item.id).unwrap_or_else(|| item.id.clone()),
        );
    }

    println!("\n{} items | detail: portfolio show <id>", items.len());
}

fn print_detail(item: &PortfolioItem) {
    let or_dash = |v: Option<&str>| v.unwrap_or("-").to_string();
    println!("Title:       {}", item.title);
    println!("Id:          {}", item.id);
    println!("Type:        {}", or_dash(item.kind.as_deref()));
    println!("Location:    {}", or_dash(item.location.as_deref()));
    println!("Completed:   {}", or_dash(item.completed_at.as_deref()));
    println!("Created:     {}", or_dash(item.created_time.as_deref()));
    if let Some(depts) = &item.departments {
        println!("Departments: {}", depts.join(", "));
    }
    if let Some(desc) = &item.description {
        println!("\n{}\n", desc);
    }

    let now = Utc::now();
    for url in item.all_image_urls() {
        let expiry = match signed_url::expires_at(url) {
            Some(_) if signed_url::is_expired(url, now) => "expired".to_string(),
            Some(t) => format!("expires {}", t.format("%Y-%m-%d %H:%M UTC")),
            None => "unsigned".to_string(),
        };
        println!("  [{}] {}", expiry, truncate(url, 80));
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
