use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use indicatif::ProgressBar;
use ragline_agent::{Orchestrator, QueryRequest};
use ragline_core::config::{Config, Settings};
use ragline_core::error::{Error, Result as CoreResult};
use ragline_core::ingest::DocumentLoader;
use ragline_core::traits::Generator;
use ragline_core::types::{Document, SearchAlgorithm, SearchQuery};
use ragline_retrieval::{MemoryCache, MemoryStore, Retriever};

/// Stands in for the generation provider when none is configured. Every call
/// fails, which drives the orchestrator's fallback chain down to the
/// deterministic context-only response.
struct NoProviderGenerator;

#[async_trait::async_trait]
impl Generator for NoProviderGenerator {
    async fn generate(
        &self,
        _system_prompt: &str,
        _prompt: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> CoreResult<String> {
        Err(Error::Generation("no generation provider configured".to_string()))
    }
}

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        eprintln!("Usage: {} <ingest|search|ask> [args...]", prog);
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

fn flag_value(args: &[String], names: &[&str]) -> Option<String> {
    let mut i = 0;
    while i < args.len() {
        if names.contains(&args[i].as_str()) && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
        i += 1;
    }
    None
}

/// Flags that take a value; everything else starting with '-' is boolean.
const VALUE_FLAGS: &[&str] = &["--algorithm", "-a", "--strategy", "-s", "--top-k", "-k"];

fn positional(args: &[String]) -> Option<String> {
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg.starts_with('-') {
            skip_next = VALUE_FLAGS.contains(&arg.as_str());
            continue;
        }
        return Some(arg.clone());
    }
    None
}

fn snapshot_path(config: &Config) -> PathBuf {
    let path: String = config
        .get("data.snapshot_path")
        .unwrap_or_else(|_| "./data/snapshot.json".to_string());
    PathBuf::from(path)
}

fn load_snapshot(config: &Config) -> anyhow::Result<Vec<Document>> {
    let path = snapshot_path(config);
    if !path.exists() {
        anyhow::bail!(
            "No document snapshot at {}. Run `ragline ingest <dir>` first.",
            path.display()
        );
    }
    let raw = fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn build_retriever(config: &Config, settings: &Settings) -> anyhow::Result<Arc<Retriever>> {
    let documents = load_snapshot(config)?;
    println!("Loaded {} documents from snapshot", documents.len());
    Ok(Arc::new(Retriever::new(
        Arc::new(MemoryStore::new(documents)),
        Arc::new(MemoryCache::new(settings.retrieval.cache_max_entries)),
        settings.retrieval.clone(),
    )))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let settings = Settings::from_config(&config);
    let (cmd, args) = parse_args();

    match cmd.as_str() {
        "ingest" => {
            let data_dir = positional(&args).map(PathBuf::from).unwrap_or_else(|| {
                let dir: String = config
                    .get("data.raw_txt_dir")
                    .unwrap_or_else(|_| "./data/txt".to_string());
                PathBuf::from(dir)
            });
            println!("Ingesting from {}", data_dir.display());

            let pb = ProgressBar::new_spinner();
            pb.set_message("Processing .txt files...");
            let loader = DocumentLoader::new();
            let documents = loader.process_directory(&data_dir)?;
            pb.finish_and_clear();

            let path = snapshot_path(&config);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, serde_json::to_string_pretty(&documents)?)?;
            println!("✅ Ingest complete ({} documents) -> {}", documents.len(), path.display());
        }
        "search" => {
            let query_text = positional(&args).unwrap_or_else(|| {
                eprintln!("Usage: ragline search \"<query>\" [--algorithm A] [--top-k N]");
                std::process::exit(1)
            });
            let algorithm = match flag_value(&args, &["--algorithm", "-a"]) {
                Some(name) => name.parse::<SearchAlgorithm>()?,
                None => SearchAlgorithm::Hybrid,
            };
            let top_k: i64 = flag_value(&args, &["--top-k", "-k"])
                .and_then(|v| v.parse().ok())
                .unwrap_or(settings.retrieval.default_top_k as i64);

            let retriever = build_retriever(&config, &settings)?;
            let query = SearchQuery::new(query_text.clone(), algorithm)
                .with_top_k(top_k)
                .with_threshold(settings.retrieval.default_threshold);

            let results = tokio::runtime::Runtime::new()?
                .block_on(async { retriever.search(&query).await })?;
            if results.is_empty() {
                println!("No results for \"{}\" ({})", query_text, algorithm);
            }
            for (i, r) in results.iter().enumerate() {
                let snippet: String = r.content.chars().take(160).collect();
                println!(
                    "{}. {} [{:.3}] ({})\n   {}",
                    i + 1,
                    r.title,
                    r.similarity_score,
                    r.source,
                    snippet
                );
            }
        }
        "ask" => {
            let query_text = positional(&args).unwrap_or_else(|| {
                eprintln!("Usage: ragline ask \"<query>\" [--strategy S] [--coordinate]");
                std::process::exit(1)
            });
            let coordinate = args.iter().any(|a| a == "--coordinate" || a == "-c");

            let retriever = build_retriever(&config, &settings)?;
            let orchestrator = Orchestrator::new(
                retriever,
                Arc::new(NoProviderGenerator),
                settings.orchestrator.clone(),
            );

            let mut request = QueryRequest::new(query_text);
            request.algorithm = flag_value(&args, &["--algorithm", "-a"]);
            request.force_strategy = flag_value(&args, &["--strategy", "-s"]);
            request.top_k = flag_value(&args, &["--top-k", "-k"]).and_then(|v| v.parse().ok());

            let response = tokio::runtime::Runtime::new()?.block_on(async {
                if coordinate {
                    orchestrator.coordinate(&request, None).await
                } else {
                    orchestrator.execute_query(&request).await
                }
            })?;

            println!("{}", response.response);
            println!(
                "\nstrategy: {}, complexity: {}, algorithm: {}, {} ms",
                response.strategy_used,
                response.complexity,
                response.algorithm,
                response.response_time_ms
            );
            if let Some(note) = &response.note {
                println!("note: {}", note);
            }
            if !response.context.is_empty() {
                println!("sources:");
                for r in &response.context {
                    println!("    {} [{:.3}]", r.title, r.similarity_score);
                }
            }
        }
        _ => {
            eprintln!("Unknown command: {}", cmd);
            std::process::exit(1);
        }
    }
    Ok(())
}
