//! End-to-end batch pipeline: load inputs, match the kit, rank videos,
//! resolve complements.
//!
//! Owns the [`SessionCache`] so repeated runs against unchanged inputs skip
//! the load entirely. All stages are synchronous; each consumes the complete
//! output of the previous one.

use crate::cache::SessionCache;
use crate::complement::{cmp_seconds, complements};
use crate::content::{ContentMention, ContentSchema, watch_url};
use crate::error::Result;
use crate::kit::load_kit;
use crate::matcher::{MatchOutcome, Scorer, TokenSetRatio, match_all};
use crate::rank::{RankOutcome, VideoRanking, rank};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Backing data locations.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub catalog: PathBuf,
    pub routine: PathBuf,
    pub mentions: PathBuf,
}

/// The pipeline entry point.
pub struct Pipeline {
    config: PipelineConfig,
    cache: SessionCache,
    scorer: Box<dyn Scorer>,
}

/// One ranked video with its kit hits and complementary products.
#[derive(Debug, Serialize)]
pub struct RankedVideo {
    #[serde(flatten)]
    pub ranking: VideoRanking,
    pub url: String,
    /// Owned-kit mentions in this video, chronological (undefined last).
    pub kit_hits: Vec<ContentMention>,
    /// Products the video uses that the user does not own, chronological and
    /// deduplicated.
    pub complements: Vec<ContentMention>,
}

/// Terminal state of a full pipeline run.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportOutcome {
    /// No content mention intersects the kit. A valid result, not a failure.
    NoOverlap,
    Ranked { videos: Vec<RankedVideo> },
}

/// Full pipeline output for one kit upload.
#[derive(Debug, Serialize)]
pub struct Report {
    pub source: ContentSchema,
    pub matches: MatchOutcome,
    pub outcome: ReportOutcome,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            cache: SessionCache::new(),
            scorer: Box::new(TokenSetRatio),
        }
    }

    /// Swap the similarity scorer (the default is token-set ratio).
    pub fn with_scorer(mut self, scorer: Box<dyn Scorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Kit-to-catalog matching only.
    pub fn match_kit(&mut self, kit_path: &Path, min_score: u32) -> Result<MatchOutcome> {
        let catalog = self.cache.catalog(&self.config.catalog)?;
        let kit = load_kit(kit_path)?;
        Ok(match_all(&kit, &catalog, min_score, self.scorer.as_ref()))
    }

    /// The complete run: match, rank, resolve complements.
    ///
    /// `limit` caps the number of ranked videos in the report.
    pub fn run(&mut self, kit_path: &Path, min_score: u32, limit: usize) -> Result<Report> {
        let catalog = self.cache.catalog(&self.config.catalog)?;
        let content = self.cache.content(&self.config.routine, &self.config.mentions)?;
        let kit = load_kit(kit_path)?;

        let matches = match_all(&kit, &catalog, min_score, self.scorer.as_ref());
        let owned = matches.owned_keys();

        let outcome = match rank(&content, &owned) {
            RankOutcome::NoOverlap => ReportOutcome::NoOverlap,
            RankOutcome::Ranked(rankings) => {
                let videos = rankings
                    .into_iter()
                    .take(limit)
                    .map(|ranking| {
                        let mut kit_hits: Vec<ContentMention> = content
                            .mentions()
                            .iter()
                            .filter(|m| m.video_id == ranking.video_id && owned.contains(&m.key))
                            .cloned()
                            .collect();
                        kit_hits.sort_by(|a, b| cmp_seconds(a.seconds, b.seconds));

                        let complements = complements(&ranking.video_id, &content, &owned)
                            .into_iter()
                            .cloned()
                            .collect();

                        RankedVideo {
                            url: watch_url(&ranking.video_id, None),
                            kit_hits,
                            complements,
                            ranking,
                        }
                    })
                    .collect();
                ReportOutcome::Ranked { videos }
            }
        };

        Ok(Report {
            source: content.schema(),
            matches,
            outcome,
        })
    }
}
