//! ragline-score
//!
//! Pure similarity scoring and result ranking. Scorers return a score vector
//! parallel to the input document slice; the ranker turns scored documents
//! into a bounded, deduplicated `SearchResult` list.

pub mod ranker;
pub mod scorer;
pub mod text;

pub use ranker::{rank, rank_results};
pub use scorer::{hybrid_scores, jaccard_scores, semantic_scores, tfidf_scores};
