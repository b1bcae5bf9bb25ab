//! # Contest Common Library
//!
//! Shared code for the contest management services:
//! - Error type used across crates
//! - Bootstrap configuration loading (CLI > ENV > TOML > defaults)
//! - Database initialization and schema

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
