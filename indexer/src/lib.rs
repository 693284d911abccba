use anyhow::{bail, Context, Result};
use invidx::persist::{
    find_row, is_writable_term, load_dictionary, load_meta, load_postings, save_dict_post,
    save_docs, save_meta, DictRow, DocMeta, IndexPaths, MetaFile, WriteSummary, FORMAT_VERSION,
};
use invidx::tokenizer::{tokenize_with, TokenizerOptions};
use invidx::{transfer, DocId, GlobalTable, LocalTable, Posting};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Deserialize)]
struct InputDoc {
    id: Option<String>,
    #[serde(default)]
    title: String,
    body: String,
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Distinct terms expected across the corpus; the global table gets three slots each.
    pub expected_terms: usize,
    /// Distinct terms expected in one document; sizes the reused local table.
    pub doc_terms: usize,
    pub tokenizer: TokenizerOptions,
}

#[derive(Debug, Default, Serialize)]
pub struct BuildReport {
    pub num_docs: u32,
    pub tokens: u64,
    /// Tokens the dictionary cannot hold, such as ones wider than its term column.
    pub skipped_tokens: u64,
    /// Tokens refused by a full local table.
    pub dropped_tokens: u64,
    pub transferred: u64,
    pub below_threshold: u64,
    /// Postings refused by a full global table.
    pub dropped_postings: u64,
    pub written: Option<WriteSummary>,
}

struct Driver {
    tokenizer: TokenizerOptions,
    local: LocalTable,
    global: GlobalTable,
    docs: BTreeMap<DocId, DocMeta>,
    report: BuildReport,
}

impl Driver {
    fn ingest(&mut self, external_id: String, source: Option<String>, body: &str) -> Result<()> {
        let doc_id = DocId::try_from(self.docs.len()).context("document ids exhausted")?;
        self.local.reset();
        for term in tokenize_with(body, &self.tokenizer) {
            self.report.tokens += 1;
            if !is_writable_term(&term) {
                self.report.skipped_tokens += 1;
                continue;
            }
            if self.local.insert(&term).is_err() {
                self.report.dropped_tokens += 1;
            }
        }
        let stats = transfer(&self.local, doc_id, &mut self.global);
        self.report.transferred += stats.transferred as u64;
        self.report.below_threshold += stats.below_threshold as u64;
        self.report.dropped_postings += stats.dropped as u64;
        self.docs.insert(doc_id, DocMeta { external_id, source });
        Ok(())
    }

    fn ingest_file(&mut self, file: &Path, root: &Path) -> Result<()> {
        let source = file.strip_prefix(root).unwrap_or(file).to_string_lossy().into_owned();
        match file.extension().and_then(|s| s.to_str()) {
            Some("jsonl") => {
                let reader = BufReader::new(File::open(file)?);
                for (i, line) in reader.lines().enumerate() {
                    let line = line?;
                    if line.trim().is_empty() {
                        continue;
                    }
                    let doc: InputDoc = serde_json::from_str(&line)
                        .with_context(|| format!("{}:{}", file.display(), i + 1))?;
                    self.ingest_input(doc, &source)?;
                }
            }
            Some("json") => {
                let reader = BufReader::new(File::open(file)?);
                let json: serde_json::Value = serde_json::from_reader(reader)
                    .with_context(|| format!("reading {}", file.display()))?;
                match json {
                    serde_json::Value::Array(arr) => {
                        for v in arr {
                            self.ingest_input(serde_json::from_value(v)?, &source)?;
                        }
                    }
                    serde_json::Value::Object(_) => {
                        self.ingest_input(serde_json::from_value(json)?, &source)?
                    }
                    _ => tracing::warn!(
                        file = %file.display(),
                        "skipping json that is not a document"
                    ),
                }
            }
            _ => {
                let bytes = fs::read(file).with_context(|| format!("reading {}", file.display()))?;
                let body = String::from_utf8_lossy(&bytes);
                self.ingest(source.clone(), Some(source), &body)?;
            }
        }
        Ok(())
    }

    fn ingest_input(&mut self, doc: InputDoc, source: &str) -> Result<()> {
        let external_id = doc.id.unwrap_or_else(|| format!("{source}#{}", self.docs.len()));
        let text = if doc.title.is_empty() {
            doc.body
        } else {
            format!("{}\n{}", doc.title, doc.body)
        };
        self.ingest(external_id, Some(source.to_string()), &text)
    }
}

/// Files under `input` in name order, or `input` itself when it is a file.
pub fn collect_files(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        bail!("input {} does not exist", input.display());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Index every document under `opts.input` and write the index to `opts.output`.
pub fn build_index(opts: &BuildOptions) -> Result<BuildReport> {
    if opts.expected_terms == 0 || opts.doc_terms == 0 {
        bail!("table sizes must be at least one term");
    }
    let files = collect_files(&opts.input)?;
    let root = if opts.input.is_dir() {
        opts.input.as_path()
    } else {
        opts.input.parent().unwrap_or(Path::new(""))
    };

    let mut driver = Driver {
        tokenizer: opts.tokenizer,
        local: LocalTable::new(opts.doc_terms),
        global: GlobalTable::new(opts.expected_terms),
        docs: BTreeMap::new(),
        report: BuildReport::default(),
    };
    for file in &files {
        driver.ingest_file(file, root)?;
    }

    let num_docs = u32::try_from(driver.docs.len()).context("too many documents")?;
    if num_docs == 0 {
        bail!("no documents found under {}", opts.input.display());
    }
    tracing::info!(num_docs, num_terms = driver.global.len(), "ingested documents");
    if driver.report.dropped_tokens > 0 || driver.report.dropped_postings > 0 {
        tracing::warn!(
            dropped_tokens = driver.report.dropped_tokens,
            dropped_postings = driver.report.dropped_postings,
            "tables filled up; raise --doc-terms or --expected-terms"
        );
    }

    let paths = IndexPaths::new(&opts.output);
    let written = save_dict_post(&paths, &driver.global, num_docs)
        .with_context(|| format!("writing index to {}", opts.output.display()))?;
    save_docs(&paths, &driver.docs)?;
    let meta = MetaFile {
        num_docs,
        capacity: driver.global.capacity(),
        terms: driver.global.len(),
        postings: written.postings,
        usage: driver.global.usage(),
        tokenizer: opts.tokenizer,
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into()),
        version: FORMAT_VERSION,
    };
    save_meta(&paths, &meta)?;

    driver.report.num_docs = num_docs;
    driver.report.written = Some(written);
    tracing::info!(output = %opts.output.display(), "index build complete");
    Ok(driver.report)
}

/// Dictionary row and postings for `term`, if it was indexed.
pub fn lookup(index: &Path, term: &str) -> Result<Option<(DictRow, Vec<Posting>)>> {
    let paths = IndexPaths::new(index);
    let rows = load_dictionary(&paths)
        .with_context(|| format!("reading dictionary in {}", index.display()))?;
    match find_row(&rows, term) {
        Some(row) => {
            let postings = load_postings(&paths, row)?;
            Ok(Some((row.clone(), postings)))
        }
        None => Ok(None),
    }
}

/// Normalize a query word the way the index at `index` normalized its documents.
///
/// Stop-word removal is skipped so that asking for a stop word reports it as missing
/// rather than printing nothing.
pub fn query_terms(index: &Path, word: &str) -> Result<Vec<String>> {
    let meta = load_meta(&IndexPaths::new(index))
        .with_context(|| format!("reading meta.json in {}", index.display()))?;
    let opts = TokenizerOptions { remove_stopwords: false, min_len: 1, ..meta.tokenizer };
    Ok(tokenize_with(word, &opts))
}
