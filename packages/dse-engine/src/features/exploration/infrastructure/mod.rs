//! Exploration infrastructure: ranking, reduction, query caching

pub mod cone_of_influence;
pub mod query_cache;
pub mod ranking;

pub use cone_of_influence::cone_of_influence;
pub use query_cache::{QueryCache, QueryFingerprint};
pub use ranking::{branch_score, rank_candidates};
