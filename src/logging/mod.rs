//! Persistent transition logs.

mod jsonl;

pub use jsonl::JsonlLogger;
