//! Session-scoped memoization of loaded inputs.
//!
//! The catalog and content corpus are immutable inputs for the lifetime of a
//! session, so each is loaded once and reused, keyed by an xxh3 fingerprint
//! of the file bytes. A changed backing file invalidates the slot on the next
//! access.

use crate::catalog::CatalogIndex;
use crate::content::{ContentIndex, ContentSchema};
use crate::error::{PipelineError, Result};
use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use xxhash_rust::xxh3::xxh3_64;

struct Slot<T> {
    fingerprint: u64,
    value: Arc<T>,
}

/// Memoized input loads for one session.
#[derive(Default)]
pub struct SessionCache {
    catalog: Option<Slot<CatalogIndex>>,
    content: Option<Slot<ContentIndex>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog index for `path`, loading it only when the file content
    /// changed since the last call.
    pub fn catalog(&mut self, path: &Path) -> Result<Arc<CatalogIndex>> {
        let bytes = read_required(path, "catalog")?;
        let fingerprint = xxh3_64(&bytes);
        if let Some(slot) = &self.catalog
            && slot.fingerprint == fingerprint
        {
            tracing::debug!("Catalog cache hit ({:016x})", fingerprint);
            return Ok(Arc::clone(&slot.value));
        }

        let value = Arc::new(CatalogIndex::from_reader(bytes.as_slice())?);
        self.catalog = Some(Slot {
            fingerprint,
            value: Arc::clone(&value),
        });
        Ok(value)
    }

    /// The content index, preferring the routine export over raw mentions.
    ///
    /// Fails with [`PipelineError::MissingResource`] when neither file
    /// exists.
    pub fn content(&mut self, routine: &Path, mentions: &Path) -> Result<Arc<ContentIndex>> {
        let (path, schema) = if routine.exists() {
            (routine, ContentSchema::Routine)
        } else if mentions.exists() {
            (mentions, ContentSchema::Mention)
        } else {
            return Err(PipelineError::MissingResource {
                what: "content (neither routine nor mentions export found)",
                path: routine.to_path_buf(),
            }
            .into());
        };

        let bytes = read_required(path, "content")?;
        let fingerprint = xxh3_64(&bytes);
        if let Some(slot) = &self.content
            && slot.fingerprint == fingerprint
            && slot.value.schema() == schema
        {
            tracing::debug!("Content cache hit ({:016x})", fingerprint);
            return Ok(Arc::clone(&slot.value));
        }

        let value = Arc::new(ContentIndex::from_reader(bytes.as_slice(), schema)?);
        self.content = Some(Slot {
            fingerprint,
            value: Arc::clone(&value),
        });
        Ok(value)
    }
}

fn read_required(path: &Path, what: &'static str) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(PipelineError::MissingResource {
            what,
            path: path.to_path_buf(),
        }
        .into());
    }
    std::fs::read(path).with_context(|| format!("reading {} {}", what, path.display()))
}
