pub mod aligner;
pub mod builder;
pub mod error;
pub mod joiner;
pub mod parquet;
pub mod solar;
