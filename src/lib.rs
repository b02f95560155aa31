//! Collection indexer - discovers the audio files under a set of collection
//! folders and decides whether the persisted track database is out of date.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod fs;
pub mod indexing;
pub mod model;
pub mod repository;
pub mod scanner;
#[cfg(test)]
pub mod test_utils;
pub mod ticks;
