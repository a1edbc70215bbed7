//! Knowledge base: chunking, ingest, and hybrid retrieval
//!
//! Retrieval runs a lexical BM25 branch and a dense vector branch in
//! parallel, fuses them with Reciprocal Rank Fusion, and diversifies the
//! final selection with Maximal Marginal Relevance.

pub mod chunker;
pub mod dao;
pub mod fusion;
pub mod lexical;
pub mod mmr;
pub mod models;

pub use dao::KnowledgeDao;
pub use lexical::LexicalIndex;
pub use models::{Chunk, Citation, Document, RetrievedChunk};
