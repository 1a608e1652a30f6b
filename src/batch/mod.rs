//! Batch matching of one reference video into many target videos

pub mod orchestrator;
pub mod report;
pub mod resolve;


pub use orchestrator::{BatchSummary, MatchOptions, TargetReport, TargetStatus, run_match};
pub use report::Report;
pub use resolve::{exclude_reference, find_videos, split_existing};
