use anyhow::{bail, Context};
use catrank::ingest::{load_scores, RawCatalog};
use catrank::{CatalogService, RankResponse, ScoredAttribute, ScorerConfig, SortMethod, UserScoredAttribute};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Product catalog taxonomy rollup, attribute scoring and ranking
#[derive(Parser, Debug)]
#[command(name = "catrank")]
#[command(about = "Explainable product ranking over a category taxonomy", long_about = None)]
struct Args {
    /// Path to the catalog JSON file
    #[arg(short, long)]
    catalog: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Equal-width bins for numeric entropy (2..=1024)
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u16).range(2..=1024))]
    bins: u16,

    /// Also score child categories as a pseudo-attribute
    #[arg(long)]
    score_subcategories: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List equivalence classes with their counts and similarity
    Tree,
    /// List the attributes of a category, most important first
    Attributes {
        category: String,
        /// entropy, correlation or score
        #[arg(long, default_value = "entropy")]
        sort: SortMethod,
        /// JSON file of attribute id -> score, used with --sort score
        #[arg(long)]
        scores: Option<PathBuf>,
    },
    /// Show one scored attribute of a category
    Attribute { category: String, attribute: String },
    /// Rank the products of a category
    Rank {
        category: String,
        /// <attribute>=<signed weight>; negative prefers lower values
        #[arg(long = "attr", required = true)]
        attributes: Vec<String>,
    },
}

#[derive(Serialize)]
struct ClassSummary<'a> {
    id: &'a str,
    name: &'a str,
    products: usize,
    rated: usize,
    tested: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    similarity: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting catrank v{}", env!("CARGO_PKG_VERSION"));
    info!("Catalog file: {:?}", args.catalog);

    let tree = RawCatalog::load(&args.catalog)?.build()?;
    let config = ScorerConfig {
        numeric_bins: usize::from(args.bins),
        score_subcategories: args.score_subcategories,
    };
    let service = CatalogService::new(tree, config);

    match args.command {
        Command::Tree => {
            let tree = service.snapshot();
            let classes: Vec<ClassSummary> = tree
                .equivalence_classes()
                .map(|class| ClassSummary {
                    id: &class.id,
                    name: &class.name,
                    products: class.count(),
                    rated: class.rated_count(),
                    tested: class.tested_count(),
                    similarity: class.similarity(),
                })
                .collect();
            print_json(&classes)
        }
        Command::Attributes { category, sort, scores } => {
            if let Some(path) = scores {
                let scores = load_scores(&path)?;
                let class_id = service
                    .snapshot()
                    .equivalence_class(&category)
                    .map_or_else(|| category.clone(), |c| c.id.clone());
                service.set_importance_scores(class_id, scores);
            }
            print_json(&service.attributes_for_category(&category, sort))
        }
        Command::Attribute { category, attribute } => {
            print_json(&service.scored_attribute_in_category(&category, &attribute))
        }
        Command::Rank { category, attributes } => {
            let scored = service.attributes_for_category(&category, SortMethod::default());
            let chosen = attributes
                .iter()
                .map(|arg| parse_weighted(arg, &scored))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let class_id = scored.first().map_or_else(|| category.clone(), |a| a.category_id.clone());
            let ranked = service.rank_products(&chosen, &category);
            print_json(&RankResponse::new(class_id, ranked))
        }
    }
}

/// Parse `<attribute>=<signed weight>` against the category's scored attributes.
fn parse_weighted(arg: &str, scored: &[ScoredAttribute]) -> anyhow::Result<UserScoredAttribute> {
    let Some((id, weight)) = arg.split_once('=') else {
        bail!("Expected <attribute>=<weight>, got '{}'", arg);
    };
    let weight: f64 = weight
        .trim()
        .parse()
        .with_context(|| format!("Invalid weight for attribute '{}'", id))?;
    let Some(attribute) = scored.iter().find(|a| a.attribute_id == id.trim()) else {
        bail!("Attribute '{}' not found in category", id);
    };
    Ok(UserScoredAttribute::from_signed(attribute.clone(), weight))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
