//! MiniRAG CLI
//!
//! A command-line interface for comparing vector, graph and hybrid retrieval.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use minirag_agents::{
    run_benchmark, ConfiguredEmbedder, ContextSource, EvaluationReport, LibrarianAgent, SearchAgent,
    SearchConfig, Strategy,
};
use minirag_core::{corpus_from_json, sample_corpus, Document, EntityMatching, Vocabulary};
use minirag_store::{EntityGraph, ScoredDocument};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

/// MiniRAG - vector, graph and hybrid retrieval over a small corpus
#[derive(Parser)]
#[command(name = "minirag")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Corpus file: a JSON array of document texts (defaults to the built-in sample)
    #[arg(short, long, global = true)]
    corpus: Option<PathBuf>,

    /// Vocabulary file in JSON (defaults to the built-in vocabulary)
    #[arg(long, global = true)]
    vocabulary: Option<PathBuf>,

    /// Embedding provider: hash, tei or ollama (overrides EMBED_PROVIDER)
    #[arg(short, long, global = true)]
    embedder: Option<String>,

    /// Documents retrieved per query (overrides RAG_TOP_K)
    #[arg(short = 'k', long, global = true)]
    top_k: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer from the nearest documents
    Vector {
        /// Query text
        query: String,
    },

    /// Answer from the one-hop neighbourhood of the query's entities
    Graph {
        /// Query text
        query: String,

        /// Match every vocabulary entity named in the query
        #[arg(long)]
        full_vocabulary: bool,
    },

    /// Answer from the graph around the query and its nearest documents
    Hybrid {
        /// Query text
        query: String,

        /// Only match entities through query intents
        #[arg(long)]
        intents_only: bool,
    },

    /// Run the benchmark suites and report faithfulness and relevance
    Eval {
        /// Only evaluate one strategy (vector, graph or hybrid)
        #[arg(short, long)]
        strategy: Option<Strategy>,

        /// Print the reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show graph statistics
    Stats,

    /// List graph entities
    Entities,

    /// Show an entity with its sources and relationships
    ShowEntity {
        /// Entity name (e.g., "Eiffel Tower")
        name: String,
    },

    /// Interactive mode
    Interactive,

    /// Print the active vocabulary as JSON
    DumpVocabulary,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Setup logging; stdout stays reserved for command output
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let corpus = load_corpus(cli.corpus.as_deref())?;
    let vocabulary = load_vocabulary(cli.vocabulary.as_deref())?;

    // Graph-only commands never touch the embedder
    match &cli.command {
        Commands::Stats => return cmd_stats(&corpus, &vocabulary),
        Commands::Entities => return cmd_entities(&corpus, &vocabulary),
        Commands::ShowEntity { name } => return cmd_show_entity(&corpus, &vocabulary, name),
        Commands::DumpVocabulary => {
            println!("{}", vocabulary.to_json_pretty()?);
            return Ok(());
        }
        _ => {}
    }

    let embedder = match &cli.embedder {
        Some(provider) => ConfiguredEmbedder::from_provider(provider)?,
        None => ConfiguredEmbedder::from_env()?,
    };
    info!("Using embedder: {}", embedder.describe());

    let embedder_ok = embedder.health().await.unwrap_or(false);
    if !embedder_ok {
        eprintln!("Error: embeddings service is not reachable.");
        eprintln!("  Embedder: {}", embedder.describe());
        eprintln!("Use --embedder hash for the offline embedder.");
        anyhow::bail!("Embeddings service unavailable");
    }

    let mut config = SearchConfig::from_env();
    if let Some(top_k) = cli.top_k {
        config.top_k = top_k;
    }

    let librarian = LibrarianAgent::new(embedder.clone(), vocabulary);
    let kb = librarian
        .index(corpus)
        .await
        .context("Failed to index corpus")?;
    let search = SearchAgent::new(kb, embedder).with_config(config);

    // Execute command
    match cli.command {
        Commands::Vector { query } => {
            cmd_vector(&search, &query).await?;
        }
        Commands::Graph {
            query,
            full_vocabulary,
        } => {
            let matching = if full_vocabulary {
                EntityMatching::FullVocabulary
            } else {
                config.graph_matching
            };
            cmd_graph(&search, &query, matching);
        }
        Commands::Hybrid {
            query,
            intents_only,
        } => {
            let matching = if intents_only {
                EntityMatching::QueryIntents
            } else {
                config.hybrid_matching
            };
            cmd_hybrid(&search, &query, matching).await?;
        }
        Commands::Eval { strategy, json } => {
            cmd_eval(&search, strategy, json).await?;
        }
        Commands::Interactive => {
            cmd_interactive(&search).await?;
        }
        Commands::Stats
        | Commands::Entities
        | Commands::ShowEntity { .. }
        | Commands::DumpVocabulary => {
            // Handled before indexing.
        }
    }

    Ok(())
}

fn load_corpus(path: Option<&Path>) -> Result<Vec<Document>> {
    let Some(path) = path else {
        return Ok(sample_corpus());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read corpus: {}", path.display()))?;
    let corpus = corpus_from_json(&content)
        .with_context(|| format!("Failed to parse corpus from: {}", path.display()))?;
    if corpus.is_empty() {
        anyhow::bail!("Corpus {} contains no documents", path.display());
    }

    debug!("Loaded {} documents from {}", corpus.len(), path.display());
    Ok(corpus)
}

fn load_vocabulary(path: Option<&Path>) -> Result<Vocabulary> {
    let Some(path) = path else {
        return Ok(Vocabulary::default());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read vocabulary: {}", path.display()))?;
    let vocabulary = Vocabulary::from_json(&content)
        .with_context(|| format!("Failed to parse vocabulary from: {}", path.display()))?;

    debug!(
        "Loaded {} entity rules and {} relation rules from {}",
        vocabulary.entities.len(),
        vocabulary.relations.len(),
        path.display()
    );
    Ok(vocabulary)
}

fn print_documents(documents: &[ScoredDocument]) {
    for (i, scored) in documents.iter().enumerate() {
        println!(
            "{}. [{}] (distance: {:.4})",
            i + 1,
            scored.document.doc_id(),
            scored.distance
        );
        println!("   {}", scored.document.text);
    }
}

fn print_snippets(snippets: &[String]) {
    for snippet in snippets {
        println!("  • {}", snippet);
    }
}

async fn cmd_vector(search: &SearchAgent<ConfiguredEmbedder>, query: &str) -> Result<()> {
    let answer = search.vector_rag(query, search.config().top_k).await?;

    println!("Retrieved documents ({}):", answer.documents.len());
    print_documents(&answer.documents);
    println!();
    println!("Answer: {}", answer.response);

    Ok(())
}

fn cmd_graph(search: &SearchAgent<ConfiguredEmbedder>, query: &str, matching: EntityMatching) {
    let answer = search.graph_rag_with(query, matching);

    if answer.entities.is_empty() {
        println!("No entities matched ({}).", matching);
    } else {
        println!("Entities: {}", answer.entities.join(", "));
        println!("Graph context ({}):", answer.snippets.len());
        print_snippets(&answer.snippets);
    }
    println!();
    println!("Answer: {}", answer.response);
}

async fn cmd_hybrid(
    search: &SearchAgent<ConfiguredEmbedder>,
    query: &str,
    matching: EntityMatching,
) -> Result<()> {
    let answer = search
        .hybrid_rag_with(query, search.config().top_k, matching)
        .await?;

    println!("Retrieved documents ({}):", answer.vector_documents.len());
    print_documents(&answer.vector_documents);
    println!();

    if answer.entities.is_empty() {
        println!("No entities matched ({}).", matching);
    } else {
        println!("Entities: {}", answer.entities.join(", "));
        println!("Graph context ({}):", answer.graph_snippets.len());
        print_snippets(&answer.graph_snippets);
    }
    println!();
    println!(
        "Context source: {}",
        match answer.context_source {
            ContextSource::Graph => "graph",
            ContextSource::Vector => "vector",
        }
    );
    println!("Answer: {}", answer.response);

    Ok(())
}

async fn cmd_eval(
    search: &SearchAgent<ConfiguredEmbedder>,
    strategy: Option<Strategy>,
    json: bool,
) -> Result<()> {
    let strategies = match strategy {
        Some(strategy) => vec![strategy],
        None => Strategy::ALL.to_vec(),
    };

    let mut reports: Vec<EvaluationReport> = Vec::new();
    for strategy in strategies {
        reports.push(run_benchmark(search, strategy, search.config().top_k).await?);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for report in &reports {
        println!("{} RAG (top_k = {}):", report.strategy, report.top_k);
        for result in &report.results {
            println!(
                "  • {} (faithfulness: {:.2}, relevance: {:.2})",
                result.query, result.evaluation.faithfulness, result.evaluation.relevance
            );
        }
        println!(
            "  Average faithfulness: {:.2}, average relevance: {:.2}",
            report.average_faithfulness, report.average_relevance
        );
        println!();
    }

    Ok(())
}

fn cmd_stats(corpus: &[Document], vocabulary: &Vocabulary) -> Result<()> {
    let graph = EntityGraph::build(corpus, vocabulary);
    let stats = graph.stats();

    println!("Graph Statistics:");
    println!("  • Documents: {}", corpus.len());
    println!("  • Entities: {}", stats.entity_count);
    println!("  • Relationships: {}", stats.relationship_count);
    println!("  • Skipped relationships: {}", stats.skipped_relationship_count);

    for skipped in graph.skipped_relationships() {
        println!(
            "    - {} --({})--> {} [{}]",
            skipped.source, skipped.relation, skipped.target, skipped.doc_id
        );
    }

    Ok(())
}

fn cmd_entities(corpus: &[Document], vocabulary: &Vocabulary) -> Result<()> {
    let graph = EntityGraph::build(corpus, vocabulary);

    if graph.stats().entity_count == 0 {
        println!("No entities found in the corpus.");
        return Ok(());
    }

    println!("Entities ({}):", graph.stats().entity_count);
    for entity in graph.entities() {
        println!(
            "  • {} [{}] ({} documents)",
            entity.name,
            entity.entity_type,
            entity.source_texts.len()
        );
    }

    Ok(())
}

fn cmd_show_entity(corpus: &[Document], vocabulary: &Vocabulary, name: &str) -> Result<()> {
    let graph = EntityGraph::build(corpus, vocabulary);
    let entity = graph.entity(name)?;

    println!("Entity: {} [{}]", entity.name, entity.entity_type);
    println!("First seen in: {}", entity.first_seen_in);
    println!();

    println!("Sources ({}):", entity.source_texts.len());
    for text in &entity.source_texts {
        println!("  • {}", text);
    }

    let neighbors: Vec<_> = graph.neighbors(&entity.name).collect();
    if neighbors.is_empty() {
        println!("No relationships.");
    } else {
        println!("Relationships ({}):", neighbors.len());
        for (neighbor, edge) in neighbors {
            println!(
                "  • {} --({})--> {} [{}]",
                entity.name, edge.relation, neighbor, edge.doc_id
            );
        }
    }

    Ok(())
}

async fn cmd_interactive(search: &SearchAgent<ConfiguredEmbedder>) -> Result<()> {
    let top_k = search.config().top_k;

    println!("MiniRAG - Interactive Mode");
    println!("Commands: vector, graph, hybrid, stats, help, quit");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("minirag> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        let (cmd, arg) = match line.trim().split_once(' ') {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (line.trim(), ""),
        };

        match cmd {
            "" => continue,

            "vector" | "v" | "graph" | "g" | "hybrid" | "h" if arg.is_empty() => {
                println!("Usage: {} <query>", cmd);
            }

            "vector" | "v" => match search.vector_rag(arg, top_k).await {
                Ok(answer) => {
                    print_documents(&answer.documents);
                    println!("→ {}", answer.response);
                }
                Err(e) => println!("Error: {}", e),
            },

            "graph" | "g" => {
                let answer = search.graph_rag(arg);
                print_snippets(&answer.snippets);
                println!("→ {}", answer.response);
            }

            "hybrid" | "h" => match search.hybrid_rag(arg, top_k).await {
                Ok(answer) => {
                    print_snippets(&answer.graph_snippets);
                    println!("→ {}", answer.response);
                }
                Err(e) => println!("Error: {}", e),
            },

            "stats" => {
                let kb = search.knowledge_base();
                let stats = kb.graph.stats();
                println!(
                    "Documents: {}, Entities: {}, Relationships: {}",
                    kb.vectors.len(),
                    stats.entity_count,
                    stats.relationship_count
                );
            }

            "help" | "?" => {
                println!("Commands:");
                println!("  vector <query>   - Answer from the nearest documents");
                println!("  graph <query>    - Answer from the entity graph");
                println!("  hybrid <query>   - Answer from both");
                println!("  stats            - Show statistics");
                println!("  quit             - Exit");
            }

            "quit" | "q" | "exit" => {
                println!("Goodbye!");
                break;
            }

            _ => {
                println!("Unknown command: {}. Type 'help' for available commands.", cmd);
            }
        }

        println!();
    }

    Ok(())
}
