use std::fs;
use std::io::Write;
use tempfile::TempDir;

use ragline_core::ingest::DocumentLoader;
use ragline_core::types::{coerce_top_k, SearchAlgorithm, DEFAULT_TOP_K};

#[test]
fn process_directory_single_small_file() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let file_path = dir.join("a.txt");
    let mut f = fs::File::create(&file_path).unwrap();
    writeln!(f, "Short text").unwrap();

    let loader = DocumentLoader::new();
    let docs = loader.process_directory(dir).expect("process");

    assert_eq!(docs.len(), 1, "one small paragraph becomes one document");
    assert_eq!(docs[0].content.trim(), "Short text");
    assert_eq!(docs[0].doc_id, "a");
    assert_eq!(docs[0].position, 0);
    assert_eq!(docs[0].total_chunks, 1);
}

#[test]
fn process_directory_limited_two_files_limit_one() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("a.txt"), "alpha bravo").unwrap();
    fs::write(dir.join("b.txt"), "charlie delta").unwrap();

    let loader = DocumentLoader::new();
    let docs = loader
        .process_directory_limited(dir, 1)
        .expect("process limited");

    // Only chunks from one source document should be present
    let mut doc_ids = std::collections::HashSet::new();
    for d in &docs {
        doc_ids.insert(d.doc_id.clone());
    }
    assert_eq!(doc_ids.len(), 1, "limited to one source document");
}

#[test]
fn paragraphs_get_increasing_positions() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("multi.txt"), "first paragraph\n\nsecond paragraph\n\nthird").unwrap();

    let docs = DocumentLoader::new().process_directory(dir).expect("process");
    assert_eq!(docs.len(), 3);
    for (i, d) in docs.iter().enumerate() {
        assert_eq!(d.position, i);
        assert_eq!(d.total_chunks, 3);
        assert_eq!(d.id, format!("multi:{}", i));
    }
}

#[test]
fn top_k_coercion_never_negative_or_zero() {
    assert_eq!(coerce_top_k(0), DEFAULT_TOP_K);
    assert_eq!(coerce_top_k(-3), DEFAULT_TOP_K);
    assert_eq!(coerce_top_k(7), 7);
    assert_eq!(coerce_top_k(500), 50);
}

#[test]
fn algorithm_parsing_is_closed() {
    assert_eq!("hybrid".parse::<SearchAlgorithm>().unwrap(), SearchAlgorithm::Hybrid);
    assert_eq!("FUZZY".parse::<SearchAlgorithm>().unwrap(), SearchAlgorithm::Fuzzy);
    assert!("cosine".parse::<SearchAlgorithm>().is_err());
}
