//! Diff line mapping and review threads for merge request reviews.
//!
//! The crate turns sparse unified-diff hunks into a complete old/new line
//! mapping, decides which lines may receive comments, addresses each file
//! version with a canonical review resource id, and keeps local comment
//! threads consistent with the remote discussions they mirror.

pub mod content;
pub mod error;
pub mod hunk;
pub mod identity;
pub mod line_map;
pub mod position;
pub mod ranges;
pub mod remote;
pub mod session;
pub mod suggestion;
pub mod thread;
pub mod types;
