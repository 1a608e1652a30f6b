//! Region correspondence between a reference frame and target videos
//!
//! [`RegionMatcher`] decides one outcome per region; [`match_video`] runs it
//! over every region of one target frame.

pub mod region;
pub mod video;


pub use region::{Diagnostic, MatchOutcome, Region, RegionMatcher};
pub use video::match_video;
