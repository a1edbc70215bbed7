//! Sentence-level answer extraction
//!
//! Given a query and the text of the best-ranked chunk, segments the chunk
//! into candidate sentences and rescores each one against the query with a
//! blend of semantic and surface-term similarity.

pub mod extractor;
pub mod segmenter;

pub use extractor::AnswerExtractor;
pub use segmenter::segment;
