use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use log::{info, warn};
use poescrape_core::cards::CARD_CATEGORIES;
use poescrape_core::client::{WikiClient, WikiClientConfig, WikiQueryApi};
use poescrape_core::config::{DEFAULT_CONFIG_FILENAME, ScrapeConfig, load_config};
use poescrape_core::pipeline::{
    PipelineOptions, PipelineReport, generated_at_now, run_card_pipeline, run_unique_pipeline,
};
use poescrape_core::style_variants::StyleVariantTable;
use poescrape_core::uniques::UNIQUE_CATEGORIES;

#[derive(Debug, Parser)]
#[command(
    name = "poescrape",
    version,
    about = "Scrape divination cards and unique items from the PoE wiki into overlay data files"
)]
struct Cli {
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(long, global = true, value_name = "PATH", help = "Directory for the output files")]
    output_dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Print run reports as JSON")]
    json: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Write DivinationCardList.txt")]
    Cards,
    #[command(about = "Write Uniques.txt")]
    Uniques,
    #[command(about = "Run both pipelines")]
    All,
}

struct RunContext {
    config: ScrapeConfig,
    options: PipelineOptions,
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        let mut command = Cli::command();
        command.print_help()?;
        println!();
        return Ok(());
    };

    let context = resolve_context(cli.config, cli.output_dir, cli.json)?;
    let started = Instant::now();
    let mut client = WikiClient::new(WikiClientConfig::from_config(&context.config))?;

    match command {
        Commands::Cards => run_cards(&context, &mut client)?,
        Commands::Uniques => run_uniques(&context, &mut client)?,
        Commands::All => {
            run_cards(&context, &mut client)?;
            run_uniques(&context, &mut client)?;
        }
    }

    info!("program execution time: {:?}", started.elapsed());
    Ok(())
}

fn run_cards<A: WikiQueryApi>(context: &RunContext, api: &mut A) -> Result<()> {
    let report = run_card_pipeline(api, &CARD_CATEGORIES, &context.options)?;
    print_report("cards", &report, context.json)
}

fn run_uniques<A: WikiQueryApi>(context: &RunContext, api: &mut A) -> Result<()> {
    let table = StyleVariantTable::load_or_embedded(context.config.style_variants_path())?;
    if table.is_empty() {
        warn!("style variant table is empty; variant items keep their full names");
    } else {
        info!("style variant table: {} entries", table.len());
    }
    let report = run_unique_pipeline(api, &UNIQUE_CATEGORIES, &table, &context.options)?;
    print_report("uniques", &report, context.json)
}

fn resolve_context(
    config_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    json: bool,
) -> Result<RunContext> {
    dotenvy::dotenv().ok();

    let config_path = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILENAME));
    let config = load_config(&config_path)?;
    let options = PipelineOptions {
        output_dir: output_dir.unwrap_or_else(|| config.output_dir()),
        source_url: config.source_url(),
        generated_at: generated_at_now(),
    };
    Ok(RunContext {
        config,
        options,
        json,
    })
}

fn print_report(pipeline: &str, report: &PipelineReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("{pipeline}");
    println!("output_path: {}", normalize_path(&report.output_path));
    println!("categories: {}", report.categories);
    println!("records: {}", report.records);
    println!("header_lines: {}", report.header_lines);
    println!("data_lines: {}", report.data_lines);
    println!("requests: {}", report.requests);
    if !report.style_variants_included.is_empty() {
        println!("style_variants:");
        for base in &report.style_variants_included {
            println!("  - {base}");
        }
    }
    if !report.warnings.is_empty() {
        println!("warnings: {}", report.warnings.len());
    }
    Ok(())
}

fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
