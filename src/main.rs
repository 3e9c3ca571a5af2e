//! Billscope CLI - resolve legislative bills to U.S. Code sections

use anyhow::Context;
use billscope::BillId;
use billscope::config::{
    self, BillscopeConfig, DEFAULT_TOP_K, DEMOGRAPHIC_INDEX_FILE, SECTION_INDEX_FILE,
};
use billscope::corpus::{CorpusStore, load_bills, load_law_mapping, load_sections};
use billscope::demographics::{
    DemographicMatch, DemographicMatcher, build_demographic_index, load_demographic_data,
};
use billscope::index::{Embedder, IndexStore, SemanticIndex, build_section_index};
use billscope::resolver::{ResolveStats, ResolvedSection, SectionResolver};
use billscope::ui::{self, Icons, Spinner};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "billscope")]
#[command(version)]
#[command(about = "Bill-to-statute resolution engine")]
#[command(long_about = r#"
Billscope maps legislative bills to the U.S. Code sections they amend:
  • Direct lookup through the public-law classification mapping
  • Extraction of explicit U.S.C. citations from bill text
  • Semantic fallback over an embedding index of the statutory corpus
  • Demographic-group scoring against a fixed taxonomy

Example usage:
  billscope build-index
  billscope resolve --bill 118_hr_82
  billscope analyze --limit 50 --output bill_analysis.json
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a billscope.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the section and demographic indexes from the ingestion artifacts
    BuildIndex {
        /// Statutory corpus artifact (JSON)
        #[arg(long)]
        sections: Option<PathBuf>,

        /// Demographic taxonomy artifact (JSON); skipped when absent
        #[arg(long)]
        demographics: Option<PathBuf>,

        /// Directory holding the persisted indexes
        #[arg(long)]
        index_dir: Option<PathBuf>,
    },

    /// Resolve one bill to its U.S. Code sections
    Resolve {
        /// Bill id, e.g. 118_hr_82
        #[arg(short, long)]
        bill: String,

        /// Maximum number of sections to return
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        #[arg(long)]
        sections: Option<PathBuf>,

        #[arg(long)]
        law_mapping: Option<PathBuf>,

        #[arg(long)]
        bills: Option<PathBuf>,

        #[arg(long)]
        index_dir: Option<PathBuf>,
    },

    /// Resolve and demographically score a batch of bills, writing a JSON report
    Analyze {
        /// Maximum number of bills to process
        #[arg(short, long, default_value = "50")]
        limit: usize,

        /// Maximum number of sections per bill
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Demographic groups per bill
        #[arg(long, default_value = "5")]
        demographic_k: usize,

        /// Report destination
        #[arg(short, long, default_value = "bill_analysis.json")]
        output: PathBuf,

        #[arg(long)]
        sections: Option<PathBuf>,

        #[arg(long)]
        law_mapping: Option<PathBuf>,

        #[arg(long)]
        bills: Option<PathBuf>,

        #[arg(long)]
        index_dir: Option<PathBuf>,
    },

    /// Show corpus and index statistics
    Stats {
        #[arg(long)]
        sections: Option<PathBuf>,

        #[arg(long)]
        law_mapping: Option<PathBuf>,

        #[arg(long)]
        bills: Option<PathBuf>,

        #[arg(long)]
        index_dir: Option<PathBuf>,
    },
}

/// Effective artifact locations after merging CLI flags, config file, and
/// built-in defaults (flags win).
struct Paths {
    sections: PathBuf,
    law_mapping: PathBuf,
    bills: PathBuf,
    demographics: PathBuf,
    index_dir: PathBuf,
    top_k: usize,
}

impl Paths {
    fn merge(config: Option<BillscopeConfig>) -> Self {
        let config = config.unwrap_or_default();
        Self {
            sections: config
                .sections
                .map(PathBuf::from)
                .unwrap_or_else(config::default_sections_path),
            law_mapping: config
                .law_mapping
                .map(PathBuf::from)
                .unwrap_or_else(config::default_law_mapping_path),
            bills: config
                .bills
                .map(PathBuf::from)
                .unwrap_or_else(config::default_bills_path),
            demographics: config
                .demographics
                .map(PathBuf::from)
                .unwrap_or_else(config::default_demographics_path),
            index_dir: config
                .index_dir
                .map(PathBuf::from)
                .unwrap_or_else(config::default_index_dir),
            top_k: config.top_k.unwrap_or(DEFAULT_TOP_K),
        }
    }

    fn section_index(&self) -> PathBuf {
        self.index_dir.join(SECTION_INDEX_FILE)
    }

    fn demographic_index(&self) -> PathBuf {
        self.index_dir.join(DEMOGRAPHIC_INDEX_FILE)
    }
}

fn override_path(base: &mut PathBuf, flag: Option<PathBuf>) {
    if let Some(path) = flag {
        *base = path;
    }
}

/// Per-bill entry of the analysis report consumed downstream
#[derive(Serialize)]
struct BillReport {
    resolved_sections: Vec<ResolvedSection>,
    matched_demographics: Vec<DemographicMatch>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let loaded_config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::BuildIndex {
            sections,
            demographics,
            index_dir,
        } => {
            let mut paths = Paths::merge(loaded_config);
            override_path(&mut paths.sections, sections);
            override_path(&mut paths.demographics, demographics);
            override_path(&mut paths.index_dir, index_dir);

            ui::header("Building indexes");
            ui::info("Corpus", &paths.sections.display().to_string());
            ui::info("Index dir", &paths.index_dir.display().to_string());

            let mut corpus = CorpusStore::new();
            load_sections(&paths.sections, &mut corpus)?;

            println!("{} Loading embedding model...", Icons::BRAIN);
            let embedder = Embedder::new()?;

            let spinner = Spinner::new("Embedding statutory sections");
            let indexed = build_section_index(&corpus, &embedder, &paths.section_index())?;
            if indexed > 0 {
                spinner.finish_with_message(format!("{} sections indexed", indexed));
            } else {
                spinner.finish_with_message("section index already exists, skipped");
            }

            let taxonomy = load_demographic_data(&paths.demographics)?;
            if taxonomy.is_empty() {
                ui::warn("no demographic taxonomy found, skipping demographic index");
            } else {
                let spinner = Spinner::new("Embedding demographic groups");
                let built =
                    build_demographic_index(&taxonomy, &embedder, &paths.demographic_index())?;
                if built > 0 {
                    spinner.finish_with_message(format!("{} groups indexed", built));
                } else {
                    spinner.finish_with_message("demographic index already exists, skipped");
                }
            }

            ui::success("Index build complete");
        }

        Commands::Resolve {
            bill,
            top_k,
            format,
            sections,
            law_mapping,
            bills,
            index_dir,
        } => {
            let mut paths = Paths::merge(loaded_config);
            override_path(&mut paths.sections, sections);
            override_path(&mut paths.law_mapping, law_mapping);
            override_path(&mut paths.bills, bills);
            override_path(&mut paths.index_dir, index_dir);
            let top_k = top_k.unwrap_or(paths.top_k);

            let bill_id = BillId::parse(&bill)?;

            let mut corpus = CorpusStore::new();
            load_sections(&paths.sections, &mut corpus)?;
            load_law_mapping(&paths.law_mapping, &mut corpus)?;
            let bill_table = load_bills(&paths.bills)?;

            let Some(record) = bill_table.get(&bill_id) else {
                ui::error(&format!("bill {} not found in the bill table", bill_id));
                return Err(
                    billscope::Error::NotFound(format!("bill {} not in bill table", bill_id)).into(),
                );
            };

            let embedder = Embedder::new()?;
            let semantic = SemanticIndex::open(&paths.section_index(), embedder)
                .with_context(|| "no section index; run `billscope build-index` first")?;

            let resolver = SectionResolver::new(&bill_table, &corpus, &semantic);
            let results = resolver.resolve(&bill_id, &record.text, top_k)?;

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                ui::header(&format!("{} - {}", bill_id, record.title));
                if let Some(law) = &record.public_law_number {
                    ui::info("Public law", law);
                }
                if results.is_empty() {
                    println!("{} No matching sections found.", Icons::SEARCH);
                } else {
                    ui::section("Resolved sections");
                    for section in &results {
                        println!(
                            "- {} (score: {:.2}, via: {})",
                            section.section_id, section.similarity_score, section.match_type
                        );
                    }
                }
            }
        }

        Commands::Analyze {
            limit,
            top_k,
            demographic_k,
            output,
            sections,
            law_mapping,
            bills,
            index_dir,
        } => {
            let mut paths = Paths::merge(loaded_config);
            override_path(&mut paths.sections, sections);
            override_path(&mut paths.law_mapping, law_mapping);
            override_path(&mut paths.bills, bills);
            override_path(&mut paths.index_dir, index_dir);
            let top_k = top_k.unwrap_or(paths.top_k);

            ui::header("Analyzing bills");

            let mut corpus = CorpusStore::new();
            load_sections(&paths.sections, &mut corpus)?;
            load_law_mapping(&paths.law_mapping, &mut corpus)?;
            let bill_table = load_bills(&paths.bills)?;

            let embedder = Embedder::new()?;
            let semantic = SemanticIndex::open(&paths.section_index(), embedder)
                .with_context(|| "no section index; run `billscope build-index` first")?;

            // The demographic stage is optional: without its index the report
            // simply carries empty match lists
            let demographic_matcher = match Embedder::new()
                .and_then(|e| DemographicMatcher::open(&paths.demographic_index(), e))
            {
                Ok(matcher) => Some(matcher),
                Err(e) => {
                    ui::warn(&format!("demographic matching disabled: {}", e));
                    None
                }
            };

            let resolver = SectionResolver::new(&bill_table, &corpus, &semantic);

            let mut ordered: Vec<&BillId> = bill_table.keys().collect();
            ordered.sort();

            let mut report: BTreeMap<String, BillReport> = BTreeMap::new();
            let mut stats = ResolveStats::default();

            for bill_id in ordered.into_iter().take(limit) {
                let bill = &bill_table[bill_id];
                if bill.text.trim().is_empty() {
                    println!("{} Skipping {}, no bill text available.", Icons::WARN, bill_id);
                    continue;
                }

                println!("{} Processing {}", Icons::SEARCH, bill_id);
                let resolved_sections =
                    resolver.resolve_with_stats(bill_id, &bill.text, top_k, &mut stats)?;

                let matched_demographics = match &demographic_matcher {
                    Some(matcher) => matcher.match_groups(&bill.text, demographic_k)?,
                    None => vec![],
                };

                report.insert(
                    bill_id.to_string(),
                    BillReport {
                        resolved_sections,
                        matched_demographics,
                    },
                );
            }

            let file = std::fs::File::create(&output)?;
            serde_json::to_writer_pretty(file, &report)?;

            println!();
            println!("{}", stats);
            ui::success(&format!(
                "Analyzed {} bills, report saved to {}",
                report.len(),
                output.display()
            ));
        }

        Commands::Stats {
            sections,
            law_mapping,
            bills,
            index_dir,
        } => {
            let mut paths = Paths::merge(loaded_config);
            override_path(&mut paths.sections, sections);
            override_path(&mut paths.law_mapping, law_mapping);
            override_path(&mut paths.bills, bills);
            override_path(&mut paths.index_dir, index_dir);

            let mut corpus = CorpusStore::new();
            load_sections(&paths.sections, &mut corpus)?;
            load_law_mapping(&paths.law_mapping, &mut corpus)?;
            let bill_table = load_bills(&paths.bills)?;

            let index_rows = |path: PathBuf| match IndexStore::open(&path) {
                Ok(store) => format!("{} vectors (dim {})", store.len(), store.dim()),
                Err(_) => "not built".to_string(),
            };

            println!("{} Billscope statistics", Icons::STATS);
            let section_index = index_rows(paths.section_index());
            let demographic_index = index_rows(paths.demographic_index());
            let table = ui::stats_table(&[
                ("Statutory sections", &corpus.section_count().to_string()),
                ("Public laws", &corpus.law_count().to_string()),
                ("Bills", &bill_table.len().to_string()),
                ("Section index", &section_index),
                ("Demographic index", &demographic_index),
            ]);
            println!("{}", table);
        }
    }

    Ok(())
}
