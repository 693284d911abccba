use crate::error::{IndexError, Result};
use crate::global::GlobalTable;
use crate::hash;
use crate::posting::Posting;
use crate::table::Usage;
use crate::tokenizer::TokenizerOptions;
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{create_dir_all, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub const DICT_TERM_WIDTH: usize = 115;
pub const DICT_NUMBER_WIDTH: usize = 5;
/// Term column of a dictionary row for an empty slot.
pub const NULL_TERM: &str = "null";
/// IDF is scaled by this before it multiplies the stored frequencies.
pub const IDF_SCALE: f32 = 1000.0;
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocMeta {
    pub external_id: String,
    pub source: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    /// Dictionary rows, one per global table slot.
    pub capacity: usize,
    pub terms: usize,
    pub postings: u64,
    pub usage: Usage,
    /// How terms were normalized at build time; queries must be normalized the same way.
    #[serde(default)]
    pub tokenizer: TokenizerOptions,
    pub created_at: String,
    pub version: u32,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn dictionary(&self) -> PathBuf { self.root.join("dictionary.txt") }
    pub fn postings(&self) -> PathBuf { self.root.join("postings.txt") }
    pub fn docs(&self) -> PathBuf { self.root.join("docs.bin") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

/// What [`write_dict_post`] produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    pub rows: usize,
    pub terms: usize,
    pub postings: u64,
}

/// One parsed dictionary row. `term` is `None` for the row of an empty slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictRow {
    pub term: Option<String>,
    pub doc_freq: i32,
    /// Index of the term's first row in the postings file, -1 for empty slots.
    pub start: i64,
}

/// `1 + ln(num_docs / doc_freq)`, with `doc_freq` clamped to at least one.
pub fn idf(num_docs: u32, doc_freq: usize) -> f32 {
    let df = doc_freq.max(1) as f64;
    (1.0 + (num_docs as f64 / df).ln()) as f32
}

/// Why `term` cannot occupy the dictionary's term column, or `None` if it can.
///
/// Rows are parsed by splitting on whitespace and the column is padded to a fixed byte
/// width, so terms must be non-empty, whitespace-free and at most `DICT_TERM_WIDTH` bytes.
pub fn term_defect(term: &str) -> Option<&'static str> {
    if term.is_empty() {
        Some("empty term")
    } else if term.len() > DICT_TERM_WIDTH {
        Some("term is wider than the dictionary column")
    } else if term.chars().any(char::is_whitespace) {
        Some("term contains whitespace")
    } else {
        None
    }
}

pub fn is_writable_term(term: &str) -> bool {
    term_defect(term).is_none()
}

/// Right-justify `term` in `DICT_TERM_WIDTH` bytes. `{:>w$}` would count chars, which
/// widens rows holding multi-byte terms.
fn write_term_column<W: Write>(out: &mut W, term: &str) -> std::io::Result<()> {
    let pad = DICT_TERM_WIDTH.saturating_sub(term.len());
    write!(out, "{:pad$}{term}", "")
}

/// Write the dictionary and postings for `global`.
///
/// The dictionary gets one row per slot in physical order, so row `i` describes slot `i`
/// and a reader can probe it with the same hash. Each occupied row carries the running
/// count of postings written before it, which is where that term's postings begin.
///
/// Every term is checked with [`term_defect`] before anything is written; one bad term
/// fails the whole call with `UnwritableTerm` and leaves both writers untouched.
pub fn write_dict_post<D: Write, P: Write>(
    global: &GlobalTable,
    num_docs: u32,
    dict: &mut D,
    post: &mut P,
) -> Result<WriteSummary> {
    if num_docs == 0 {
        return Err(IndexError::EmptyCorpus);
    }
    if let Some((term, reason)) = global
        .iter()
        .find_map(|(term, _)| term_defect(term).map(|reason| (term, reason)))
    {
        return Err(IndexError::UnwritableTerm { term: term.to_string(), reason });
    }
    let mut start: u64 = 0;
    let mut summary = WriteSummary { rows: 0, terms: 0, postings: 0 };
    for slot in global.slots() {
        match slot {
            Some((term, entry)) => {
                write_term_column(dict, term)?;
                writeln!(dict, " {:>nw$} {start:>nw$}", entry.doc_freq, nw = DICT_NUMBER_WIDTH)?;
                let scale = idf(num_docs, entry.postings.len()) * IDF_SCALE;
                for posting in &entry.postings {
                    posting.write_to(post, Some(scale))?;
                }
                start += entry.postings.len() as u64;
                summary.terms += 1;
            }
            None => {
                write_term_column(dict, NULL_TERM)?;
                writeln!(dict, " {:>nw$} {:>nw$}", -1, -1, nw = DICT_NUMBER_WIDTH)?;
            }
        }
        summary.rows += 1;
    }
    summary.postings = start;
    Ok(summary)
}

/// Write `dictionary.txt` and `postings.txt` under `paths.root`.
pub fn save_dict_post(
    paths: &IndexPaths,
    global: &GlobalTable,
    num_docs: u32,
) -> Result<WriteSummary> {
    create_dir_all(&paths.root)?;
    let mut dict = BufWriter::new(File::create(paths.dictionary())?);
    let mut post = BufWriter::new(File::create(paths.postings())?);
    let summary = write_dict_post(global, num_docs, &mut dict, &mut post)?;
    dict.flush()?;
    post.flush()?;
    let Usage { used, collisions, lookups } = global.usage();
    tracing::info!(
        rows = summary.rows,
        postings = summary.postings,
        used,
        collisions,
        lookups,
        "dictionary and postings written"
    );
    Ok(summary)
}

pub fn parse_dict_row(line: &str, line_no: usize) -> Result<DictRow> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [term, df, start] = fields.as_slice() else {
        return Err(malformed(line_no, format!("expected 3 fields, found {}", fields.len())));
    };
    let doc_freq: i32 = df
        .parse()
        .map_err(|_| malformed(line_no, format!("bad document frequency {df:?}")))?;
    let start: i64 = start
        .parse()
        .map_err(|_| malformed(line_no, format!("bad offset {start:?}")))?;
    // "null" is a legal term too; only the -1 columns mark an empty slot.
    let term = if *term == NULL_TERM && doc_freq == -1 {
        None
    } else {
        Some(term.to_string())
    };
    Ok(DictRow { term, doc_freq, start })
}

pub fn parse_dictionary<R: BufRead>(reader: R) -> Result<Vec<DictRow>> {
    reader
        .lines()
        .enumerate()
        .map(|(i, line)| parse_dict_row(&line?, i + 1))
        .collect()
}

pub fn load_dictionary(paths: &IndexPaths) -> Result<Vec<DictRow>> {
    parse_dictionary(BufReader::new(File::open(paths.dictionary())?))
}

/// Locate `term` in a loaded dictionary by replaying the table's probe sequence over the
/// rows. Stops at the first empty row.
pub fn find_row<'a>(rows: &'a [DictRow], term: &str) -> Option<&'a DictRow> {
    if rows.is_empty() {
        return None;
    }
    let mut index = hash::bucket(term, rows.len());
    for _ in 0..rows.len() {
        let row = &rows[index];
        match row.term.as_deref() {
            None => return None,
            Some(t) if t == term => return Some(row),
            Some(_) => index = (index + 1) % rows.len(),
        }
    }
    None
}

/// Parse one postings row. The returned posting's frequency is the stored weighted value.
pub fn parse_posting(line: &str, line_no: usize) -> Result<Posting> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [doc_id, weight] = fields.as_slice() else {
        return Err(malformed(line_no, format!("expected 2 fields, found {}", fields.len())));
    };
    let doc_id: DocId = doc_id
        .parse()
        .map_err(|_| malformed(line_no, format!("bad doc id {doc_id:?}")))?;
    let weight: f32 = weight
        .parse()
        .map_err(|_| malformed(line_no, format!("bad weight {weight:?}")))?;
    Ok(Posting::new(doc_id, weight))
}

/// Read the postings a dictionary row points at.
pub fn read_postings<R: BufRead>(reader: R, row: &DictRow) -> Result<Vec<Posting>> {
    if row.term.is_none() || row.start < 0 {
        return Ok(Vec::new());
    }
    let start = row.start as usize;
    let wanted = row.doc_freq.max(0) as usize;
    let postings = reader
        .lines()
        .enumerate()
        .skip(start)
        .take(wanted)
        .map(|(i, line)| parse_posting(&line?, i + 1))
        .collect::<Result<Vec<_>>>()?;
    if postings.len() != wanted {
        let line = start + postings.len() + 1;
        return Err(malformed(line, format!("expected {wanted} postings from row {start}")));
    }
    Ok(postings)
}

pub fn load_postings(paths: &IndexPaths, row: &DictRow) -> Result<Vec<Posting>> {
    read_postings(BufReader::new(File::open(paths.postings())?), row)
}

pub fn save_docs(paths: &IndexPaths, docs: &BTreeMap<DocId, DocMeta>) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.docs())?;
    let bytes = bincode::serialize(docs)?;
    f.write_all(&bytes)?;
    Ok(())
}

pub fn load_docs(paths: &IndexPaths) -> Result<BTreeMap<DocId, DocMeta>> {
    let mut f = File::open(paths.docs())?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let docs = bincode::deserialize(&buf)?;
    Ok(docs)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

fn malformed(line: usize, reason: String) -> IndexError {
    IndexError::Malformed { line, reason }
}
