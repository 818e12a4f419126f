//! Default feature computers.
//!
//! Both are pure: they never touch the network and produce at most one vector per
//! symbol. Custom computers implement the `confluence_core` traits directly.

mod candle;
mod snapshot;

pub use candle::EmaTrendFeatureComputer;
pub use snapshot::SnapshotFeatureBuilder;
