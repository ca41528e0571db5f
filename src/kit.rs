//! User kit upload parsing.
//!
//! Kit CSVs arrive with loose headers: `Brand` and `Product Name` are
//! required (the latter also accepted as `Product`), `Product Type` and
//! `Shade Name` are optional with `Type`/`Shade` aliases. Lookup is exact
//! first, then case-insensitive.

use crate::error::{PipelineError, Result};
use crate::normalize::{canon, search_text};
use anyhow::Context;
use csv::StringRecord;
use std::io::Read;
use std::path::Path;

/// A starter kit CSV showing the expected columns.
pub const TEMPLATE_CSV: &str = "\
Brand,Product Name,Product Type,Shade Name
Urban Decay,Naked3 Eyeshadow Palette,Eyeshadow Palette,
Too Faced,Better Than Sex Masacra,Mascara,
KVD Beauty,Tattoo Liner,Liquid Eyeliner,Trooper Black
";

/// One kit row, canonicalized.
#[derive(Debug, Clone)]
pub struct KitEntry {
    pub brand: String,
    pub product_name: String,
    pub product_type: String,
    pub shade_name: String,
    /// Lowercased `product_name + " " + product_type`, the fuzzy query.
    pub query: String,
    /// Lowercased brand, used to select the candidate pool.
    pub brand_lower: String,
}

/// Load a kit CSV from disk.
pub fn load_kit(path: &Path) -> Result<Vec<KitEntry>> {
    let file =
        std::fs::File::open(path).with_context(|| format!("opening kit {}", path.display()))?;
    parse_kit(file)
}

/// Parse kit CSV data.
///
/// Fails with [`PipelineError::InvalidInput`] when the header lacks `Brand`
/// or `Product Name` after alias resolution.
pub fn parse_kit<R: Read>(reader: R) -> Result<Vec<KitEntry>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers().context("reading kit header")?.clone();

    let brand_col = find_column(&headers, &["Brand"]);
    let product_col = find_column(&headers, &["Product Name", "Product"]);
    let type_col = find_column(&headers, &["Product Type", "Type"]);
    let shade_col = find_column(&headers, &["Shade Name", "Shade"]);

    let (Some(brand_col), Some(product_col)) = (brand_col, product_col) else {
        return Err(PipelineError::InvalidInput(
            "kit CSV must include 'Brand' and 'Product Name' columns".to_string(),
        )
        .into());
    };

    let mut entries = Vec::new();
    for record in rdr.records() {
        let record = record.context("reading kit row")?;
        let field = |col: usize| canon(record.get(col).unwrap_or(""));
        let optional = |col: Option<usize>| col.map_or_else(String::new, field);

        let product_name = field(product_col);
        let product_type = optional(type_col);
        entries.push(KitEntry {
            brand: field(brand_col),
            query: search_text(&product_name, &product_type),
            brand_lower: field(brand_col).to_lowercase(),
            shade_name: optional(shade_col),
            product_name,
            product_type,
        });
    }
    Ok(entries)
}

/// Resolve a column by name: exact match first, then case-insensitive, across
/// the accepted aliases in order.
fn find_column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    for name in names {
        if let Some(idx) = headers.iter().position(|h| h == *name) {
            return Some(idx);
        }
    }
    for name in names {
        if let Some(idx) = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
        {
            return Some(idx);
        }
    }
    None
}
