//! Track freshness and collection staleness.
//!
//! # Overview
//!
//! - [`TrackVerifier`]: per-track "has the file changed / is it dirty" checks
//! - [`CollectionChecker`]: cheap whole-collection staleness heuristic
//! - [`Reconciler`]: full diff of disk against the database, and applying it
//!
//! # Example
//!
//! ```ignore
//! let checker = CollectionChecker::new(library.clone(), fetcher);
//! if checker.is_collection_outdated().await? {
//!     let reconciler = Reconciler::new(library.clone(), fetcher);
//!     let plan = reconciler.plan().await?;
//!     reconciler.apply(&plan, &library).await?;
//! }
//! ```

mod checker;
mod reconcile;
mod verifier;

pub use checker::{CollectionChecker, CollectionStatus};
pub use reconcile::{IndexingPlan, IndexingSummary, Reconciler};
pub use verifier::TrackVerifier;
