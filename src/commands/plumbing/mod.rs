//! Plumbing commands (low-level object access)
//!
//! - `cat-file`: Print the payload of a stored object
//! - `hash-object`: Compute an object ID and optionally store the object
//! - `rev-parse`: Resolve a name to an object ID

pub mod cat_file;
pub mod hash_object;
pub mod rev_parse;
