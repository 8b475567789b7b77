//! Retrieval and filtering pipeline: build the query, scan the newest-first
//! listing inside the time window, collect and clean each post's comments,
//! and write the records out.

pub mod assembler;
pub mod cleaner;
pub mod collector;
pub mod pipeline;
pub mod quality;
pub mod query;
pub mod scanner;
pub mod writer;

pub use assembler::assemble_post;
pub use cleaner::TextCleaner;
pub use collector::CommentTreeCollector;
pub use pipeline::Pipeline;
pub use quality::QualityFilter;
pub use query::{build_query, SearchQuery};
pub use scanner::TimeWindowedScanner;
pub use writer::write_results;
