//! Value types of the object store
//!
//! - `objects`: object kinds, ids, and their payload encodings
//! - `revision`: mapping user-supplied names to object ids

pub mod objects;
pub mod revision;
