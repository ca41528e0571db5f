//! Reference product catalog loading and brand-partitioned candidate pools.

use crate::error::{PipelineError, Result};
use crate::normalize::{canon, search_text};
use ahash::AHashMap;
use anyhow::{Context, bail};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

/// One reference SKU, canonicalized at load time.
///
/// Immutable after loading; `search_text` is the fuzzy-match target and
/// `brand_lower` partitions the candidate pool.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub brand: String,
    pub product_name: String,
    pub product_type: String,
    pub category_group: String,
    /// Lowercased `product_name + " " + product_type`.
    pub search_text: String,
    /// Lowercased brand.
    pub brand_lower: String,
}

/// The loaded catalog with a brand partition over its entries.
///
/// The partition and the full entry list are both exposed; falling back from
/// an empty partition to the full catalog is the matcher's decision, not the
/// index's.
#[derive(Debug)]
pub struct CatalogIndex {
    entries: Vec<CatalogEntry>,
    by_brand: AHashMap<String, Vec<usize>>,
}

const REQUIRED_COLUMNS: [&str; 4] = ["Brand", "Product Name", "Product Type", "Category Group"];

impl CatalogIndex {
    /// Load the catalog from a CSV file.
    ///
    /// Fails with [`PipelineError::MissingResource`] when the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PipelineError::MissingResource {
                what: "catalog",
                path: path.to_path_buf(),
            }
            .into());
        }
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening catalog {}", path.display()))?;
        Self::from_reader(file)
    }

    /// Build the index from catalog CSV data.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr.headers().context("reading catalog header")?.clone();

        let mut columns = [0usize; 4];
        for (slot, name) in columns.iter_mut().zip(REQUIRED_COLUMNS) {
            match headers.iter().position(|h| h == name) {
                Some(idx) => *slot = idx,
                None => bail!("catalog is missing required column '{}'", name),
            }
        }
        let [brand_col, product_col, type_col, group_col] = columns;

        let mut entries = Vec::new();
        let mut by_brand: AHashMap<String, Vec<usize>> = AHashMap::new();
        for record in rdr.records() {
            let record = record.context("reading catalog row")?;
            let field = |col: usize| canon(record.get(col).unwrap_or(""));

            let brand = field(brand_col);
            let product_name = field(product_col);
            let product_type = field(type_col);
            let entry = CatalogEntry {
                search_text: search_text(&product_name, &product_type),
                brand_lower: brand.to_lowercase(),
                category_group: field(group_col),
                brand,
                product_name,
                product_type,
            };
            by_brand
                .entry(entry.brand_lower.clone())
                .or_default()
                .push(entries.len());
            entries.push(entry);
        }

        tracing::debug!(
            "Loaded catalog: {} entries across {} brands",
            entries.len(),
            by_brand.len()
        );
        Ok(Self { entries, by_brand })
    }

    /// All entries in load order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Entry indices sharing the given lowercase brand. Empty when the brand
    /// is unknown.
    pub fn pool_for(&self, brand_lower: &str) -> &[usize] {
        self.by_brand
            .get(brand_lower)
            .map_or(&[][..], Vec::as_slice)
    }

    pub fn get(&self, index: usize) -> &CatalogEntry {
        &self.entries[index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
