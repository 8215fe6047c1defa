use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use lexrisk_advisory::AdvisoryClient;
use lexrisk_ai::{ClassifierRegistry, KeywordBackend};
use lexrisk_analysis::{Analyzer, JurisdictionSelector};
use lexrisk_core::{AnalysisConfig, ContractSummary, ProfileRegistry, ProfilesFile, excerpt};

mod display;

const DEFAULT_PROFILES_PATH: &str = "config/profiles.json";
const ADVISORY_EXCERPT_LEN: usize = 500;

#[derive(Parser)]
#[command(name = "lexrisk", version, about = "Contract clause classification and risk analysis")]
struct Cli {
    /// Analysis configuration JSON; defaults apply when omitted.
    #[arg(long, global = true, env = "LEXRISK_CONFIG")]
    config: Option<PathBuf>,

    /// Jurisdiction profiles JSON.
    #[arg(long, global = true, env = "LEXRISK_PROFILES")]
    profiles: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List registered jurisdictions.
    Profiles,

    /// Classify a single clause.
    Classify {
        /// Clause text; reads stdin when omitted.
        #[arg(long)]
        text: Option<String>,

        /// Jurisdiction id, or "all".
        #[arg(long, default_value = "all")]
        jurisdiction: String,
    },

    /// Segment, classify, and risk-score a whole contract.
    Analyze {
        /// Contract text file; reads stdin when omitted.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Jurisdiction id, or "all".
        #[arg(long, default_value = "all")]
        jurisdiction: String,

        /// Contract id; defaults to the file stem.
        #[arg(long)]
        id: Option<String>,

        /// Request an advisory narrative for each summary.
        #[arg(long)]
        advisory: bool,

        /// Emit JSON instead of cards.
        #[arg(long)]
        json: bool,
    },

    /// Compare one contract across two jurisdictions.
    Compare {
        /// Contract text file; reads stdin when omitted.
        #[arg(long)]
        file: Option<PathBuf>,

        #[arg(long)]
        a: String,

        #[arg(long)]
        b: String,

        /// Contract id; defaults to the file stem.
        #[arg(long)]
        id: Option<String>,

        /// Emit JSON instead of cards.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tracing::info!("lexrisk v{}", env!("CARGO_PKG_VERSION"));
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let profiles_file = load_profiles(cli.profiles.as_deref())?;

    let profiles = Arc::new(
        ProfileRegistry::from_specs(profiles_file.profiles.clone())
            .context("registering jurisdiction profiles")?,
    );
    let fallback = build_fallback(&profiles, &profiles_file.fallback_lexicon)?;
    let classifiers =
        ClassifierRegistry::from_profiles(&profiles, fallback, config.acceptance_threshold);
    let analyzer = Analyzer::new(profiles.clone(), classifiers, &config);

    match cli.command {
        Command::Profiles => {
            for id in profiles.ids() {
                let profile = profiles.get(id)?;
                println!(
                    "{id}: {} clause types, {} mandatory",
                    profile.clause_types.len(),
                    profile.mandatory.len()
                );
            }
        }

        Command::Classify { text, jurisdiction } => {
            let text = match text {
                Some(text) => text,
                None => read_stdin()?,
            };
            let selector = JurisdictionSelector::parse(&jurisdiction);
            let results = analyzer.classify_clause(&text, &selector)?;
            for result in results.values() {
                print!("{}", display::classification_card(result));
            }
        }

        Command::Analyze {
            file,
            jurisdiction,
            id,
            advisory,
            json,
        } => {
            let (contract_id, text) = read_contract(file.as_deref(), id)?;
            let selector = JurisdictionSelector::parse(&jurisdiction);
            let summaries = analyzer.analyze_contract(&contract_id, &text, &selector)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                for summary in summaries.values() {
                    print!("{}", display::summary_card(summary));
                }
            }

            if advisory {
                let client = AdvisoryClient::new(&config.advisory)?;
                for summary in summaries.values() {
                    print_advisory(&client, &text, summary).await;
                }
            }
        }

        Command::Compare { file, a, b, id, json } => {
            let (contract_id, text) = read_contract(file.as_deref(), id)?;
            let mut summaries = BTreeMap::new();
            for jurisdiction in [&a, &b] {
                let selector = JurisdictionSelector::parse(jurisdiction);
                summaries.extend(analyzer.analyze_contract(&contract_id, &text, &selector)?);
            }

            let summary_a = summaries
                .get(&a)
                .with_context(|| format!("no summary for jurisdiction {a:?}"))?;
            let summary_b = summaries
                .get(&b)
                .with_context(|| format!("no summary for jurisdiction {b:?}"))?;
            let result = analyzer.compare_jurisdictions(summary_a, summary_b)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", display::comparison_card(&result));
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AnalysisConfig> {
    match path {
        None => Ok(AnalysisConfig::default()),
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
        }
    }
}

fn load_profiles(path: Option<&Path>) -> anyhow::Result<ProfilesFile> {
    let path = path.unwrap_or(Path::new(DEFAULT_PROFILES_PATH));
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading profiles {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing profiles {}", path.display()))
}

/// Build the shared fallback backend.
///
/// Uses the configured fallback lexicon when present; otherwise a generic
/// backend over the union of all profile taxonomies, which has no keywords
/// and therefore only ever produces Uncategorized predictions.
fn build_fallback(
    profiles: &ProfileRegistry,
    fallback_lexicon: &BTreeMap<String, Vec<String>>,
) -> anyhow::Result<Arc<KeywordBackend>> {
    let labels: Vec<String> = if fallback_lexicon.is_empty() {
        let mut labels: Vec<String> = Vec::new();
        for profile in profiles.iter() {
            for label in &profile.clause_types {
                if !labels.contains(label) {
                    labels.push(label.clone());
                }
            }
        }
        labels
    } else {
        fallback_lexicon.keys().cloned().collect()
    };

    let backend = KeywordBackend::new("lexicon:fallback", &labels, fallback_lexicon)
        .context("building fallback backend")?;
    Ok(Arc::new(backend))
}

async fn print_advisory(client: &AdvisoryClient, text: &str, summary: &ContractSummary) {
    let outcome = client
        .advise_summary(&excerpt(text, ADVISORY_EXCERPT_LEN), summary)
        .await;
    println!();
    println!("── Advisory [{}] ──", summary.jurisdiction);
    if let Some(warning) = &outcome.warning {
        println!("  warning: {warning}");
    }
    println!("{}", outcome.narrative);
}

fn read_stdin() -> anyhow::Result<String> {
    std::io::read_to_string(std::io::stdin()).context("reading stdin")
}

fn read_contract(file: Option<&Path>, id: Option<String>) -> anyhow::Result<(String, String)> {
    match file {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading contract {}", path.display()))?;
            let contract_id = id.unwrap_or_else(|| {
                path.file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "contract".to_string())
            });
            Ok((contract_id, text))
        }
        None => {
            let text = read_stdin()?;
            Ok((id.unwrap_or_else(|| "contract".to_string()), text))
        }
    }
}
