use anyhow::Result;
use clap::{Parser, Subcommand};
use invidx::tokenizer::TokenizerOptions;
use invidx_indexer::{build_index, lookup, query_terms, BuildOptions};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a hashed dictionary/postings index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a file or directory of documents
    Build {
        /// Input file or directory; .json/.jsonl hold documents, any other file is one document
        #[arg(long)]
        input: PathBuf,
        /// Output index directory
        #[arg(long)]
        output: PathBuf,
        /// Expected distinct terms in the whole corpus
        #[arg(long, default_value_t = 50_000)]
        expected_terms: usize,
        /// Expected distinct terms in a single document
        #[arg(long, default_value_t = 5_000)]
        doc_terms: usize,
        /// Index surface forms instead of stems
        #[arg(long, default_value_t = false)]
        no_stem: bool,
        /// Index stop words too
        #[arg(long, default_value_t = false)]
        keep_stopwords: bool,
    },
    /// Print the dictionary row and postings of a term
    Lookup {
        /// Index directory
        #[arg(long, default_value = "./index")]
        index: PathBuf,
        term: String,
        /// Look the term up as given instead of normalizing it with the index's build options
        #[arg(long, default_value_t = false)]
        raw: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, expected_terms, doc_terms, no_stem, keep_stopwords } => {
            let tokenizer = TokenizerOptions {
                stem: !no_stem,
                remove_stopwords: !keep_stopwords,
                ..TokenizerOptions::default()
            };
            let opts = BuildOptions { input, output, expected_terms, doc_terms, tokenizer };
            let report = build_index(&opts)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Lookup { index, term, raw } => {
            let terms = if raw { vec![term] } else { query_terms(&index, &term)? };
            for term in terms {
                match lookup(&index, &term)? {
                    Some((row, postings)) => {
                        println!("{term}: df={} start={}", row.doc_freq, row.start);
                        for p in postings {
                            println!("{p}");
                        }
                    }
                    None => println!("{term}: not indexed"),
                }
            }
        }
    }
    Ok(())
}
