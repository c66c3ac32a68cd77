//! Inline source map handling for transformed modules
//!
//! This crate embeds a module's source map into its transformed code as a
//! tagged base64 trailer, and recovers it later from the flat text. The
//! trailer is self-identifying so it survives stages that only see code
//! strings (caching, on-disk writes, eval-style execution) without a side
//! channel for the map.

pub mod error;
pub mod inline;
pub mod map;
pub mod paths;

pub use error::*;
pub use inline::*;
pub use map::*;
pub use paths::*;
