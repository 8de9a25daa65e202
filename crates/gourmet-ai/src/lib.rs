pub mod config;
pub mod error;
pub mod extractor;
pub mod openai;
pub mod resolver;
pub mod search;
pub mod summary;
pub mod taxonomy;
pub mod telemetry;
