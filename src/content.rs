//! Per-video product mention loading.
//!
//! Two interchangeable source schemas exist in the wild: routine exports (one
//! row per routine step) and raw mention exports (one row per detected
//! mention). Their column vocabularies differ; both are resolved through an
//! explicit [`ColumnMap`] once at load time and normalized into a single
//! [`ContentMention`] shape.

use crate::error::{PipelineError, Result};
use crate::normalize::{canon, composite_key, parse_seconds};
use anyhow::{Context, bail};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

/// Which source shape the content rows arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSchema {
    /// `routine_per_video` export: one row per routine step.
    Routine,
    /// Raw `mentions` export: one row per detected mention.
    Mention,
}

impl ContentSchema {
    /// Column names for this schema, resolved once at load time.
    const fn columns(self) -> ColumnMap {
        match self {
            Self::Routine => ColumnMap {
                video_id: "videoId",
                brand: "brand",
                product: "product",
                product_type: "product_type",
                shade: "shade",
                time: "time_start",
                title: "title",
                step: "step",
            },
            Self::Mention => ColumnMap {
                video_id: "videoId",
                brand: "Brand",
                product: "Product Name",
                product_type: "Product Type",
                shade: "Shade Name",
                time: "chunk_start",
                title: "title",
                step: "step",
            },
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Routine => "routine",
            Self::Mention => "mentions",
        }
    }
}

/// Schema-specific column vocabulary.
struct ColumnMap {
    video_id: &'static str,
    brand: &'static str,
    product: &'static str,
    product_type: &'static str,
    shade: &'static str,
    time: &'static str,
    title: &'static str,
    step: &'static str,
}

/// One normalized product mention within a video.
#[derive(Debug, Clone, Serialize)]
pub struct ContentMention {
    pub video_id: String,
    pub title: String,
    pub step: String,
    pub brand: String,
    pub product: String,
    pub product_type: String,
    pub shade: String,
    /// Timestamp within the video. `None` means "no timestamp", which is
    /// distinct from second 0.
    pub seconds: Option<f64>,
    /// Composite `brand|product|type` join key.
    pub key: String,
}

/// The loaded content corpus in original row order.
#[derive(Debug)]
pub struct ContentIndex {
    mentions: Vec<ContentMention>,
    schema: ContentSchema,
}

impl ContentIndex {
    /// Load whichever content export is present, preferring routine data.
    ///
    /// Fails with [`PipelineError::MissingResource`] when neither file exists.
    pub fn load_available(routine: &Path, mentions: &Path) -> Result<Self> {
        if routine.exists() {
            Self::load(routine, ContentSchema::Routine)
        } else if mentions.exists() {
            Self::load(mentions, ContentSchema::Mention)
        } else {
            Err(PipelineError::MissingResource {
                what: "content (neither routine nor mentions export found)",
                path: routine.to_path_buf(),
            }
            .into())
        }
    }

    pub fn load(path: &Path, schema: ContentSchema) -> Result<Self> {
        if !path.exists() {
            return Err(PipelineError::MissingResource {
                what: "content",
                path: path.to_path_buf(),
            }
            .into());
        }
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening content {}", path.display()))?;
        Self::from_reader(file, schema)
    }

    /// Build the index from content CSV data in the given schema.
    pub fn from_reader<R: Read>(reader: R, schema: ContentSchema) -> Result<Self> {
        let columns = schema.columns();
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr.headers().context("reading content header")?.clone();
        let position = |name: &str| headers.iter().position(|h| h == name);

        let required = |name: &'static str| -> Result<usize> {
            match position(name) {
                Some(idx) => Ok(idx),
                None => bail!("content ({}) is missing required column '{}'", schema.label(), name),
            }
        };
        let video_col = required(columns.video_id)?;
        let brand_col = required(columns.brand)?;
        let product_col = required(columns.product)?;
        let type_col = required(columns.product_type)?;
        // Optional columns default to empty or derived values.
        let shade_col = position(columns.shade);
        let time_col = position(columns.time);
        let title_col = position(columns.title);
        let step_col = position(columns.step);

        let mut mentions = Vec::new();
        for record in rdr.records() {
            let record = record.context("reading content row")?;
            let field = |col: usize| canon(record.get(col).unwrap_or(""));
            let optional = |col: Option<usize>| col.map_or_else(String::new, field);

            let video_id = field(video_col);
            let brand = field(brand_col);
            let product = field(product_col);
            let product_type = field(type_col);
            let title = match title_col {
                Some(col) => field(col),
                // Title falls back to the video id.
                None => video_id.clone(),
            };
            mentions.push(ContentMention {
                key: composite_key(&brand, &product, &product_type),
                seconds: time_col.and_then(|col| parse_seconds(record.get(col).unwrap_or(""))),
                shade: optional(shade_col),
                step: optional(step_col),
                video_id,
                title,
                brand,
                product,
                product_type,
            });
        }

        tracing::debug!(
            "Loaded {} content mentions from {} data",
            mentions.len(),
            schema.label()
        );
        Ok(Self { mentions, schema })
    }

    /// All mentions in original row order.
    pub fn mentions(&self) -> &[ContentMention] {
        &self.mentions
    }

    pub const fn schema(&self) -> ContentSchema {
        self.schema
    }

    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }
}

/// Canonical watch URL for a video, with a jump-to offset when a timestamp is
/// defined.
pub fn watch_url(video_id: &str, seconds: Option<f64>) -> String {
    match seconds {
        Some(sec) => format!(
            "https://www.youtube.com/watch?v={}&t={}s",
            video_id, sec as i64
        ),
        None => format!("https://www.youtube.com/watch?v={}", video_id),
    }
}
