use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use log::{info, warn};
use serde::Serialize;

use crate::cards::{
    CARD_OUTPUT_FILENAME, card_file_header, format_card_line, parse_card_results,
};
use crate::client::WikiQueryApi;
use crate::markup::MarkupRules;
use crate::output::OutputFile;
use crate::ranges::RangePatterns;
use crate::style_variants::StyleVariantTable;
use crate::uniques::{
    UNIQUES_OUTPUT_FILENAME, format_unique_lines, parse_unique_results, unique_file_header,
};

pub const GENERATED_AT_FORMAT: &str = "%Y-%m-%d at %H:%M:%S";

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub output_dir: PathBuf,
    pub source_url: String,
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub output_path: PathBuf,
    pub categories: usize,
    pub records: usize,
    pub header_lines: usize,
    pub data_lines: usize,
    pub requests: usize,
    pub warnings: Vec<String>,
    pub style_variants_included: Vec<String>,
}

pub fn generated_at_now() -> String {
    Local::now().format(GENERATED_AT_FORMAT).to_string()
}

pub fn run_card_pipeline<A: WikiQueryApi>(
    api: &mut A,
    categories: &[&str],
    options: &PipelineOptions,
) -> Result<PipelineReport> {
    let rules = MarkupRules::new()?;
    let header = card_file_header(&options.source_url, &options.generated_at);
    let output =
        OutputFile::create_with_header(&options.output_dir.join(CARD_OUTPUT_FILENAME), &header)?;

    let mut cards = Vec::new();
    for category in categories {
        let payload = api.fetch_card_results(category)?;
        cards.extend(parse_card_results(&payload, &rules)?);
    }

    let lines = cards.iter().map(format_card_line).collect::<Vec<_>>();
    let data_lines = output.append_lines(&lines)?;
    info!(
        "wrote {data_lines} card lines to {}",
        output.path().display()
    );

    Ok(PipelineReport {
        output_path: output.path().to_path_buf(),
        categories: categories.len(),
        records: cards.len(),
        header_lines: header.len(),
        data_lines,
        requests: api.request_count(),
        warnings: Vec::new(),
        style_variants_included: Vec::new(),
    })
}

pub fn run_unique_pipeline<A: WikiQueryApi>(
    api: &mut A,
    categories: &[&str],
    table: &StyleVariantTable,
    options: &PipelineOptions,
) -> Result<PipelineReport> {
    let rules = MarkupRules::new()?;
    let patterns = RangePatterns::new()?;
    let header = unique_file_header(&options.source_url, &options.generated_at);
    let output = OutputFile::create_with_header(
        &options.output_dir.join(UNIQUES_OUTPUT_FILENAME),
        &header,
    )?;

    let mut items = Vec::new();
    for category in categories {
        let payload = api.fetch_unique_results(category)?;
        items.extend(parse_unique_results(&payload, &rules)?);
    }

    let formatted = format_unique_lines(&items, table, &patterns)?;
    for warning in &formatted.warnings {
        warn!("{warning}");
    }
    if !formatted.style_variants_included.is_empty() {
        info!(
            "prepared style variants included for: {} (make sure they are still correct)",
            formatted.style_variants_included.join(", ")
        );
    }

    let data_lines = output.append_lines(&formatted.lines)?;
    info!(
        "wrote {data_lines} unique lines to {}",
        output.path().display()
    );

    Ok(PipelineReport {
        output_path: output.path().to_path_buf(),
        categories: categories.len(),
        records: items.len(),
        header_lines: header.len(),
        data_lines,
        requests: api.request_count(),
        warnings: formatted.warnings,
        style_variants_included: formatted.style_variants_included,
    })
}
