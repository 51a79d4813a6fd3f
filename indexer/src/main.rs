use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use pantry_core::persist::{load_index, save_index, save_meta, IndexPaths, MetaFile};
use pantry_core::{Catalog, InventoryModel, InventorySource, RankingConfig, Recommender, TextIndex};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "pantry")]
#[command(about = "Rank household needs by urgency and match them against a product catalog", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an index snapshot from a catalog file or directory
    Build {
        /// Catalog path (.json, .jsonl, or a directory of them)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
    },
    /// Print the priority queue and the best products for the most urgent need
    Recommend {
        /// Catalog path; a missing or unreadable catalog yields no products
        #[arg(long, conflicts_with = "index")]
        catalog: Option<String>,
        /// Prebuilt index directory
        #[arg(long)]
        index: Option<String>,
        /// Inventory JSON file
        #[arg(long)]
        inventory: String,
        /// Ranking config JSON file
        #[arg(long)]
        config: Option<String>,
        /// Candidate need; repeatable. Defaults to every tracked inventory item
        #[arg(long = "need")]
        needs: Vec<String>,
        /// Override the configured number of products
        #[arg(long)]
        top_n: Option<usize>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output } => build_index(&input, &output),
        Commands::Recommend { catalog, index, inventory, config, needs, top_n } => {
            recommend(catalog.as_deref(), index.as_deref(), &inventory, config.as_deref(), needs, top_n)
        }
    }
}

fn build_index(input: &str, output: &str) -> Result<()> {
    let catalog = Catalog::load(input)?;
    let index = TextIndex::build(&catalog);
    tracing::info!(num_docs = index.num_docs(), num_terms = index.num_terms(), "indexed catalog");

    let out_paths = IndexPaths::new(output);
    save_index(&out_paths, &index)?;
    let created_at = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "".into());
    save_meta(&out_paths, &MetaFile::for_index(&index, created_at))?;

    tracing::info!(output, "index build complete");
    Ok(())
}

fn recommend(
    catalog: Option<&str>,
    index_dir: Option<&str>,
    inventory_path: &str,
    config_path: Option<&str>,
    needs: Vec<String>,
    top_n: Option<usize>,
) -> Result<()> {
    let index = match (catalog, index_dir) {
        (_, Some(dir)) => load_index(&IndexPaths::new(dir))?,
        (Some(path), None) => TextIndex::build(&Catalog::load_or_empty(path)),
        (None, None) => bail!("either --catalog or --index is required"),
    };
    let inventory = InventoryModel::from_path(inventory_path)?;
    let mut config = match config_path {
        Some(path) => RankingConfig::from_path(path)?,
        None => RankingConfig::default(),
    };
    if let Some(n) = top_n {
        config.top_n = n;
    }
    let candidates = if needs.is_empty() { inventory.names() } else { needs };

    let recommender = Recommender::new(&index, &inventory, &config)?;
    println!("\n>>> ANALYZING USER NEEDS...");
    let priorities = recommender.prioritize(&candidates);
    println!("\n--- PRIORITY QUEUE ---");
    for p in &priorities {
        println!("Item: {:<10} | Urgency: {:.2} | Context: {}", p.query, p.urgency_score, p.reason);
    }

    let rec = recommender.recommend(&candidates)?;
    println!("\n>>> WINNER: '{}' is the most urgent need.", rec.need.query);
    println!(">>> Fetching best products for '{}'...", rec.need.query);
    println!("\n--- RECOMMENDED PRODUCTS TO BUY ---");
    if rec.matches.is_empty() {
        println!("(no products above the relevance threshold)");
    }
    for m in &rec.matches {
        println!("Product: {}", m.product.name);
        println!("Price:   {}", m.product.price);
        println!("Match:   {:.2}", m.relevance);
        println!("{}", "-".repeat(30));
    }
    Ok(())
}
