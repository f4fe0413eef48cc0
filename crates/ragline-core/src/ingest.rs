use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{Document, Meta};

#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    pub max_tokens: usize,
    pub overlap_percent: f32,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { max_tokens: 500, overlap_percent: 0.2 }
    }
}

/// Loads `.txt` files under a directory and splits them into store-ready
/// `Document` chunks. Paragraphs that fit the token budget become one chunk;
/// longer ones are windowed with overlap.
#[derive(Default)]
pub struct DocumentLoader {
    chunking_config: ChunkingConfig,
}

impl DocumentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_directory(&self, data_dir: &Path) -> Result<Vec<Document>> {
        self.process_files(data_dir, None)
    }

    pub fn process_directory_limited(&self, data_dir: &Path, limit: usize) -> Result<Vec<Document>> {
        self.process_files(data_dir, Some(limit))
    }

    fn process_files(&self, data_dir: &Path, limit: Option<usize>) -> Result<Vec<Document>> {
        let mut files = self.list_txt_files(data_dir);
        if files.is_empty() {
            tracing::warn!("No .txt files found under {}", data_dir.display());
            return Ok(vec![]);
        }
        if let Some(limit) = limit {
            if files.len() > limit {
                files.truncate(limit);
                tracing::info!("Limited to first {} files", limit);
            }
        }

        let mut all_docs = Vec::new();
        for (file_index, file_path) in files.iter().enumerate() {
            tracing::debug!(
                "Processing file {}/{}: {}",
                file_index + 1,
                files.len(),
                file_path.display()
            );
            let content = self.read_file_content(file_path)?;
            let doc_id = self.extract_doc_id(file_path);
            let source = self.relative_source(file_path, data_dir);
            all_docs.extend(self.chunk_content(&content, &doc_id, &source));
        }
        tracing::info!("Processed {} files into {} documents", files.len(), all_docs.len());
        Ok(all_docs)
    }

    fn read_file_content(&self, file_path: &Path) -> Result<String> {
        match fs::read_to_string(file_path) {
            Ok(content) => Ok(content),
            Err(_) => Ok(String::from_utf8_lossy(&fs::read(file_path)?).to_string()),
        }
    }

    fn extract_doc_id(&self, file_path: &Path) -> String {
        file_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "untitled".to_string())
    }

    fn relative_source(&self, file_path: &Path, data_dir: &Path) -> String {
        file_path
            .strip_prefix(data_dir)
            .unwrap_or(file_path)
            .to_string_lossy()
            .to_string()
    }

    fn chunk_content(&self, content: &str, doc_id: &str, source: &str) -> Vec<Document> {
        let mut docs = Vec::new();
        let mut position = 0usize;
        for paragraph in content.split("\n\n") {
            let paragraph = paragraph.trim();
            if paragraph.is_empty() {
                continue;
            }
            if crate::tokens::estimate_tokens(paragraph) <= self.chunking_config.max_tokens {
                docs.push(self.make_document(paragraph, doc_id, source, position));
                position += 1;
            } else {
                for sub_chunk in self.split_paragraph_with_overlap(paragraph) {
                    docs.push(self.make_document(&sub_chunk, doc_id, source, position));
                    position += 1;
                }
            }
        }
        let total = docs.len();
        for doc in &mut docs {
            doc.total_chunks = total;
        }
        docs
    }

    fn make_document(&self, content: &str, doc_id: &str, source: &str, position: usize) -> Document {
        Document {
            id: format!("{}:{}", doc_id, position),
            doc_id: doc_id.to_string(),
            title: doc_id.to_string(),
            content: content.to_string(),
            source: source.to_string(),
            position,
            total_chunks: 0,
            metadata: Meta::new(),
            embedding: None,
            similarity_score: None,
        }
    }

    fn split_paragraph_with_overlap(&self, paragraph: &str) -> Vec<String> {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        let words_per_chunk = 300;
        let overlap_words = (words_per_chunk as f32 * self.chunking_config.overlap_percent) as usize;
        let mut chunks = Vec::new();
        let mut start = 0;
        while start < words.len() {
            let end = (start + words_per_chunk).min(words.len());
            chunks.push(words[start..end].join(" "));
            if end >= words.len() {
                break;
            }
            start = end - overlap_words;
        }
        chunks
    }

    fn list_txt_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut txt_files = Vec::new();
        for entry in walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("txt") {
                txt_files.push(path.to_path_buf());
            }
        }
        txt_files.sort();
        txt_files
    }
}
