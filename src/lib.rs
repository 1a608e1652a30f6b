pub mod batch;
pub mod config;
pub mod correspondence;
pub mod error;
pub mod feature_matching;
pub mod settings;
pub mod template_matching;
pub mod video;

pub use config::{FeatureConfig, MatchConfig, MatchMode, RansacConfig};
pub use correspondence::{MatchOutcome, Region, RegionMatcher};
pub use error::{MatchError, MatchResult};
