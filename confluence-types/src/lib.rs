//! Confluence-specific error, configuration, and report primitives shared by every crate
//! in the workspace.
#![warn(missing_docs)]

mod capability;
mod config;
mod error;
mod interval;
mod reports;

pub use capability::Capability;
pub use config::{
    LOCAL_PROXY_FALLBACK, MarketType, PipelineConfig, ProxySetting, SourceConfig,
    TimeframeConfig, TimeframeMode,
};
pub use error::ConfluenceError;
pub use interval::Interval;
pub use reports::FetchReport;
