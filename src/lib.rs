pub mod analyzers;
pub mod config;
pub mod course;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod normalize;
pub mod output;
pub mod parser;
pub mod pipeline;
