pub mod cache;
pub mod catalog;
pub mod cli;
pub mod complement;
pub mod content;
pub mod error;
pub mod kit;
pub mod matcher;
pub mod normalize;
pub mod pipeline;
pub mod rank;
pub mod trace;

pub use catalog::{CatalogEntry, CatalogIndex};
pub use content::{ContentIndex, ContentMention, ContentSchema, watch_url};
pub use error::{PipelineError, Result};
pub use kit::KitEntry;
pub use matcher::{MatchOutcome, MatchResult, OwnedKeys, Scorer, TokenSetRatio};
pub use pipeline::{Pipeline, PipelineConfig, RankedVideo, Report, ReportOutcome};
pub use rank::{RankOutcome, VideoRanking};
