use invidx::persist::{load_dictionary, load_docs, load_meta, IndexPaths, DICT_TERM_WIDTH};
use invidx::tokenizer::TokenizerOptions;
use invidx_indexer::{build_index, lookup, query_terms, BuildOptions};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn options(input: &Path, output: &Path) -> BuildOptions {
    BuildOptions {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        expected_terms: 100,
        doc_terms: 50,
        tokenizer: TokenizerOptions { stem: false, remove_stopwords: true, min_len: 2 },
    }
}

#[test]
fn builds_index_from_directory() {
    let dir = tempdir().unwrap();
    let corpus = dir.path().join("corpus");
    fs::create_dir_all(corpus.join("nested")).unwrap();
    fs::write(corpus.join("a.txt"), "rust rust rust rust compiler").unwrap();
    let html = "<p>rust rust rust rust</p> <p>borrow borrow borrow borrow</p>";
    fs::write(corpus.join("b.html"), html).unwrap();
    let jsonl = concat!(
        "{\"id\":\"c1\",\"body\":\"borrow borrow borrow borrow checker\"}\n",
        "\n",
        "{\"id\":\"c2\",\"body\":\"nothing repeats here\"}\n",
    );
    fs::write(corpus.join("nested/c.jsonl"), jsonl).unwrap();
    let out = dir.path().join("index");

    let report = build_index(&options(&corpus, &out)).unwrap();
    assert_eq!(report.num_docs, 4);
    assert_eq!(report.transferred, 4);
    assert_eq!(report.dropped_postings, 0);
    let written = report.written.unwrap();
    assert_eq!(written.rows, 300);
    assert_eq!(written.postings, 4);

    let paths = IndexPaths::new(&out);
    assert_eq!(load_dictionary(&paths).unwrap().len(), 300);
    let docs = load_docs(&paths).unwrap();
    assert_eq!(docs[&0].external_id, "a.txt");
    assert_eq!(docs[&2].external_id, "c1");
    assert_eq!(load_meta(&paths).unwrap().num_docs, 4);

    let (row, postings) = lookup(&out, "rust").unwrap().unwrap();
    assert_eq!(row.doc_freq, 2);
    let ids: Vec<i32> = postings.iter().map(|p| p.doc_id()).collect();
    assert_eq!(ids, vec![0, 1]);
    assert!(lookup(&out, "compiler").unwrap().is_none());
}

#[test]
fn empty_corpus_fails() {
    let dir = tempdir().unwrap();
    let corpus = dir.path().join("empty");
    fs::create_dir_all(&corpus).unwrap();
    let err = build_index(&options(&corpus, &dir.path().join("out"))).unwrap_err();
    assert!(err.to_string().contains("no documents"));
}

#[test]
fn small_local_table_drops_tokens_but_finishes() {
    let dir = tempdir().unwrap();
    let doc = dir.path().join("doc.txt");
    fs::write(&doc, "alpha beta gamma delta epsilon zeta eta theta").unwrap();
    let mut opts = options(&doc, &dir.path().join("out"));
    opts.doc_terms = 1;
    let report = build_index(&opts).unwrap();
    assert_eq!(report.num_docs, 1);
    assert_eq!(report.tokens, 8);
    assert_eq!(report.dropped_tokens, 5);
}

#[test]
fn over_wide_tokens_are_skipped_not_fatal() {
    let dir = tempdir().unwrap();
    let doc = dir.path().join("doc.txt");
    let wide = "w".repeat(DICT_TERM_WIDTH + 5);
    fs::write(&doc, format!("{wide} {wide} {wide} {wide} rust rust rust rust")).unwrap();
    let out = dir.path().join("out");
    let report = build_index(&options(&doc, &out)).unwrap();
    assert_eq!(report.tokens, 8);
    assert_eq!(report.skipped_tokens, 4);
    assert_eq!(report.written.unwrap().terms, 1);
    assert!(lookup(&out, "rust").unwrap().is_some());
}

#[test]
fn queries_follow_the_build_time_tokenizer() {
    let dir = tempdir().unwrap();
    let doc = dir.path().join("doc.txt");
    fs::write(&doc, "running running running running").unwrap();

    let plain = dir.path().join("plain");
    build_index(&options(&doc, &plain)).unwrap();
    assert!(!load_meta(&IndexPaths::new(&plain)).unwrap().tokenizer.stem);
    let terms = query_terms(&plain, "Running").unwrap();
    assert_eq!(terms, vec!["running"]);
    assert!(lookup(&plain, &terms[0]).unwrap().is_some());

    let stemmed = dir.path().join("stemmed");
    let mut opts = options(&doc, &stemmed);
    opts.tokenizer.stem = true;
    build_index(&opts).unwrap();
    let terms = query_terms(&stemmed, "Running").unwrap();
    assert_eq!(terms, vec!["run"]);
    assert!(lookup(&stemmed, &terms[0]).unwrap().is_some());
}
