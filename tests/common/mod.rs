//! Shared test fixtures and utilities for integration tests.
//!
//! Each test gets an isolated temp directory seeded with a small catalog and
//! content corpus, so session caches never observe another test's files.

use rstest::fixture;
use std::path::PathBuf;
use tempfile::TempDir;

use kitmatch::pipeline::PipelineConfig;

pub const CATALOG_CSV: &str = "\
Brand,Product Name,Product Type,Category Group
Urban Decay,Naked3 Eyeshadow Palette,Eyeshadow Palette,Eyes
Too Faced,Better Than Sex Mascara,Mascara,Eyes
KVD Beauty,Tattoo Liner,Liquid Eyeliner,Eyes
NARS,Orgasm Blush,Blush,Cheeks
";

pub const ROUTINE_CSV: &str = "\
videoId,title,step,brand,product,product_type,shade,time_start
v1,Soft Glam,Eyes,Urban Decay,Naked3 Eyeshadow Palette,Eyeshadow Palette,,650
v1,Soft Glam,Eyes,Too Faced,Better Than Sex Mascara,Mascara,,700
v1,Soft Glam,Cheeks,NARS,Orgasm Blush,Blush,Orgasm,800
v2,Five Minute Face,Eyes,Urban Decay,Naked3 Eyeshadow Palette,Eyeshadow Palette,,30
v2,Five Minute Face,Eyes,KVD Beauty,Tattoo Liner,Liquid Eyeliner,Trooper Black,90
v2,Five Minute Face,Cheeks,NARS,Orgasm Blush,Blush,Orgasm,120
";

pub const MENTIONS_CSV: &str = "\
videoId,Brand,Product Name,Product Type,Shade Name,chunk_start
v9,Urban Decay,Naked3 Eyeshadow Palette,Eyeshadow Palette,,45
v9,NARS,Orgasm Blush,Blush,Orgasm,88
";

pub const KIT_CSV: &str = "\
Brand,Product Name,Product Type,Shade Name
urban decay,naked 3 palette,,
Too Faced,Better Than Sex Mascara,Mascara,
";

/// An isolated data directory with catalog and content files on disk.
pub struct DataDir {
    temp: TempDir,
}

#[allow(dead_code)] // Helpers used across different integration test crates
impl DataDir {
    pub fn write(&self, name: &str, body: &str) -> PathBuf {
        let path = self.temp.path().join(name);
        std::fs::write(&path, body).expect("writing fixture file");
        path
    }

    pub fn remove(&self, name: &str) {
        let _ = std::fs::remove_file(self.temp.path().join(name));
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.temp.path().join(name)
    }

    pub fn config(&self) -> PipelineConfig {
        PipelineConfig {
            catalog: self.path("sku_catalog.csv"),
            routine: self.path("routine_per_video.csv"),
            mentions: self.path("mentions.csv"),
        }
    }

    /// Write the standard kit and return its path.
    pub fn kit(&self) -> PathBuf {
        self.write("my_kit.csv", KIT_CSV)
    }
}

/// A data directory seeded with the standard catalog and routine corpus.
#[fixture]
pub fn data_dir() -> DataDir {
    let dir = DataDir {
        temp: TempDir::new().expect("creating temp dir"),
    };
    dir.write("sku_catalog.csv", CATALOG_CSV);
    dir.write("routine_per_video.csv", ROUTINE_CSV);
    dir
}
