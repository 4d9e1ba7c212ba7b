//! On-disk repository areas
//!
//! - `config`: the repository configuration file
//! - `database`: loose object database (compression, hashing, fan-out paths)
//! - `refs`: read-only reference lookup (HEAD, branches, tags)
//! - `repository`: repository handle, discovery and creation

pub mod config;
pub mod database;
pub mod refs;
pub mod repository;
