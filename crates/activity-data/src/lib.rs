//! Data layer for GitHub Archive activity analytics.
//!
//! Responsible for discovering and decoding hourly archive files, buffering
//! events for querying, single-pass aggregation, and the top-level report
//! pipeline.

pub mod aggregator;
pub mod analysis;
pub mod analyzer;
pub mod reader;
