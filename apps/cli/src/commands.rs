//! CLI command definitions, routing, and tracing setup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing::info;

use rigmate_catalog::{Catalog, ReconcileOutcome};
use rigmate_shared::{
    AppConfig, BuildRecommendation, Component, ComponentId, ComponentType, Condition, RawListing,
    UseCase, expand_home, init_config, load_config,
};
use rigmate_storage::Storage;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// rigmate: marketplace PC parts, normalized and assembled.
#[derive(Parser)]
#[command(
    name = "rigmate",
    version,
    about = "Ingest marketplace listings and assemble compatibility-checked PC builds.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Catalog database path (defaults to the configured one).
    #[arg(long, global = true)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Ingest raw listings from a JSON-lines file into the catalog.
    Ingest {
        /// Path to a .jsonl file, one listing object per line.
        file: PathBuf,
    },

    /// Assemble a build recommendation from the catalog.
    Build {
        /// Budget in DZD.
        #[arg(short, long)]
        budget: Option<u64>,

        /// Use case: gaming, productivity, ai, or balanced.
        #[arg(short, long)]
        use_case: Option<UseCase>,

        /// Categories to fill (comma-separated). Defaults to all seven.
        #[arg(long, value_delimiter = ',')]
        categories: Vec<ComponentType>,
    },

    /// Check compatibility across cataloged components.
    Check {
        /// Component ids to evaluate together.
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Reconcile an agent's build suggestion against the catalog.
    Agent {
        /// Read the agent response from a file ("-" for stdin).
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Agent response text inline.
        #[arg(short, long, conflicts_with = "file")]
        text: Option<String>,

        /// Budget in DZD for fallback assembly.
        #[arg(short, long)]
        budget: Option<u64>,

        /// Use case: gaming, productivity, ai, or balanced.
        #[arg(short, long)]
        use_case: Option<UseCase>,
    },

    /// List cataloged components.
    List {
        /// Restrict to one category.
        #[arg(short = 't', long = "type")]
        ctype: Option<ComponentType>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "rigmate=info",
        1 => "rigmate=debug",
        _ => "rigmate=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = load_config()?;
    let db_path = cli
        .db
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(|| expand_home(&config.defaults.db_path));

    match cli.command {
        Command::Ingest { file } => cmd_ingest(&config, &db_path, &file).await,
        Command::Build {
            budget,
            use_case,
            categories,
        } => cmd_build(&config, &db_path, budget, use_case, &categories).await,
        Command::Check { ids } => cmd_check(&db_path, &ids).await,
        Command::Agent {
            file,
            text,
            budget,
            use_case,
        } => cmd_agent(&config, &db_path, file.as_deref(), text.as_deref(), budget, use_case).await,
        Command::List { ctype } => cmd_list(&db_path, ctype).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(&config).await,
        },
    }
}

// ---------------------------------------------------------------------------
// Ingest
// ---------------------------------------------------------------------------

/// One line of an ingest file. The price may arrive pre-normalized
/// (`price_dzd`) or as raw marketplace text (`price`, e.g. "$340").
#[derive(Debug, Deserialize)]
struct ListingRecord {
    #[serde(rename = "type")]
    ctype: ComponentType,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    price_dzd: Option<u64>,
    #[serde(default)]
    price: Option<String>,
    source_url: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    condition: Option<Condition>,
}

async fn cmd_ingest(config: &AppConfig, db_path: &Path, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| eyre!("cannot read {}: {e}", file.display()))?;
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    info!(file = %file.display(), listings = lines.len(), "ingesting listings");

    let storage = Storage::open(db_path).await?;
    let mut components = storage.load_catalog().await?;

    let bar = ProgressBar::new(lines.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:30.cyan} {pos}/{len} {msg}")
            .expect("static progress template"),
    );

    let mut counts: HashMap<&'static str, usize> = HashMap::new();
    let mut skipped = 0usize;

    for (line_no, line) in lines.iter().enumerate() {
        bar.inc(1);
        let record: ListingRecord = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(line = line_no + 1, error = %e, "skipping malformed listing");
                skipped += 1;
                continue;
            }
        };

        let price_dzd = match (record.price_dzd, record.price.as_deref()) {
            (Some(p), _) => p,
            (None, Some(raw)) => match rigmate_parse::normalize_price(raw, &config.rates) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(line = line_no + 1, error = %e, "skipping listing with unreadable price");
                    skipped += 1;
                    continue;
                }
            },
            (None, None) => {
                tracing::warn!(line = line_no + 1, "skipping listing without a price");
                skipped += 1;
                continue;
            }
        };

        let listing = RawListing {
            title: record.title,
            description: record.description,
            price_dzd,
            source_url: record.source_url,
            location: record.location,
            condition: record.condition,
        };

        // Snapshot per listing so duplicates within one batch still collapse.
        let catalog = Catalog::new(components.clone());
        let now = Utc::now();
        let result = rigmate_engine::ingest(&catalog, record.ctype, &listing, now);
        bar.set_message(result.component.id.to_string());

        let stored_id = storage.upsert_component(&result.component).await?;
        storage
            .append_price_point(&stored_id, listing.price_dzd, now)
            .await?;

        match result.outcome {
            ReconcileOutcome::Created => *counts.entry("created").or_default() += 1,
            ReconcileOutcome::Refreshed => *counts.entry("refreshed").or_default() += 1,
            ReconcileOutcome::Respecced => *counts.entry("respecced").or_default() += 1,
        }
        upsert_local(&mut components, result.component);
    }
    bar.finish_and_clear();

    println!();
    println!("  Ingest complete");
    println!("  Created:   {}", counts.get("created").unwrap_or(&0));
    println!("  Refreshed: {}", counts.get("refreshed").unwrap_or(&0));
    println!("  Respecced: {}", counts.get("respecced").unwrap_or(&0));
    println!("  Skipped:   {skipped}");
    println!("  Catalog:   {} components", components.len());
    println!();

    Ok(())
}

/// Keep the in-memory component list in sync with what was just stored.
fn upsert_local(components: &mut Vec<Component>, component: Component) {
    match components.iter_mut().find(|c| c.id == component.id) {
        Some(existing) => *existing = component,
        None => components.push(component),
    }
}

// ---------------------------------------------------------------------------
// Build / check / agent
// ---------------------------------------------------------------------------

async fn cmd_build(
    config: &AppConfig,
    db_path: &Path,
    budget: Option<u64>,
    use_case: Option<UseCase>,
    categories: &[ComponentType],
) -> Result<()> {
    let (budget, use_case) = resolve_build_args(config, budget, use_case)?;
    let categories: Vec<ComponentType> = if categories.is_empty() {
        ComponentType::ASSEMBLY_ORDER.to_vec()
    } else {
        categories.to_vec()
    };

    let storage = Storage::open_readonly(db_path).await?;
    let catalog = Catalog::new(storage.load_catalog().await?);

    info!(budget, %use_case, categories = categories.len(), "assembling build");
    let recommendation =
        rigmate_engine::get_build(&catalog, config, budget, use_case, &categories)?;
    print_recommendation(&catalog, &recommendation);
    Ok(())
}

async fn cmd_check(db_path: &Path, ids: &[String]) -> Result<()> {
    let storage = Storage::open_readonly(db_path).await?;
    let catalog = Catalog::new(storage.load_catalog().await?);

    let ids: Vec<ComponentId> = ids.iter().map(|s| ComponentId::from(s.as_str())).collect();
    let (verdict, violations) = rigmate_engine::check_compatibility(&catalog, &ids)?;

    println!();
    println!("  Compatibility: {verdict}");
    if !violations.is_empty() {
        println!("  Violations:");
        for rule in &violations {
            println!("    - {rule}");
        }
    }
    println!();
    Ok(())
}

async fn cmd_agent(
    config: &AppConfig,
    db_path: &Path,
    file: Option<&Path>,
    text: Option<&str>,
    budget: Option<u64>,
    use_case: Option<UseCase>,
) -> Result<()> {
    let text = match (file, text) {
        (Some(path), _) if path == Path::new("-") => std::io::read_to_string(std::io::stdin())?,
        (Some(path), _) => std::fs::read_to_string(path)
            .map_err(|e| eyre!("cannot read {}: {e}", path.display()))?,
        (None, Some(t)) => t.to_string(),
        (None, None) => return Err(eyre!("provide the agent response via --file or --text")),
    };

    let (budget, use_case) = resolve_build_args(config, budget, use_case)?;

    let storage = Storage::open_readonly(db_path).await?;
    let catalog = Catalog::new(storage.load_catalog().await?);

    let recommendation = rigmate_engine::reconcile_agent_output(
        &catalog,
        config,
        &text,
        budget,
        use_case,
        &ComponentType::ASSEMBLY_ORDER,
    )?;
    print_recommendation(&catalog, &recommendation);
    Ok(())
}

fn resolve_build_args(
    config: &AppConfig,
    budget: Option<u64>,
    use_case: Option<UseCase>,
) -> Result<(u64, UseCase)> {
    let budget = budget.unwrap_or(config.defaults.budget_dzd);
    let use_case = match use_case {
        Some(uc) => uc,
        None => config
            .defaults
            .use_case
            .parse()
            .map_err(|e: String| eyre!("invalid configured use_case: {e}"))?,
    };
    Ok((budget, use_case))
}

fn print_recommendation(catalog: &Catalog, recommendation: &BuildRecommendation) {
    println!();
    println!("  Build recommendation");
    println!("  Compatibility: {}", recommendation.compatibility);
    println!("  Total price:   {} DZD", recommendation.total_price_dzd);
    println!();
    for (ctype, id) in &recommendation.components {
        let name = catalog
            .get(id)
            .map(|c| c.raw_name.as_str())
            .unwrap_or("(unknown)");
        let price = catalog.get(id).map(|c| c.price_dzd).unwrap_or(0);
        println!("  {:<12} {name}  [{price} DZD]  ({id})", ctype.as_str());
    }
    if !recommendation.violations.is_empty() {
        println!();
        println!("  Violations:");
        for rule in &recommendation.violations {
            println!("    - {rule}");
        }
    }
    println!();
    println!("  {}", recommendation.rationale);
    println!();
}

// ---------------------------------------------------------------------------
// List / config
// ---------------------------------------------------------------------------

async fn cmd_list(db_path: &Path, ctype: Option<ComponentType>) -> Result<()> {
    let storage = Storage::open_readonly(db_path).await?;
    let components = match ctype {
        Some(t) => storage.list_by_type(t).await?,
        None => storage.load_catalog().await?,
    };

    println!();
    println!("  {} components", components.len());
    println!();
    for c in &components {
        let score = c
            .scores
            .as_ref()
            .map(|s| s.benchmark.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<12} {:<40} {:>9} DZD  score {:>3}  ({})",
            c.ctype.as_str(),
            truncate(&c.raw_name, 40),
            c.price_dzd,
            score,
            c.id
        );
    }
    println!();
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}
