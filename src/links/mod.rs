// src/links/mod.rs
// =============================================================================
// The friend-link document: its data model and how it is read and written.
//
// Submodules:
// - model: the document tree, the LinkRecord view and the lifecycle status
// - store: load/save of the JSON file and folding check results back in
// =============================================================================

mod model;
mod store;

pub use model::{FriendLinksDocument, LinkRecord, LinkStatus};
pub use store::{apply_results, load, save};
