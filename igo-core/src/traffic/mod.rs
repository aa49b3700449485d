//! Traffic-aware graph construction: joining the feeds, stamping congestion
//! onto the road graph and deriving travel times from it.

pub mod cost;
pub mod join;
pub mod mapper;
pub mod snap;

pub use cost::{CostModel, PONDERATION_TABLE_VERSION, Ponderations};
pub use join::join;
pub use mapper::{CongestionMapper, FailedSnap, FailedSnapSet};
pub use snap::{NearestNodeSnapper, SnapGap, SnapOutcome, Snapper};
