//! Porcelain commands
//!
//! - `init`: Initialize a new repository

pub mod init;
