use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kitmatch")]
#[command(about = "Match your product kit against a catalog and find tutorials that use it", long_about = None)]
pub struct Cli {
    /// Catalog CSV, one row per SKU
    #[arg(long, default_value = "data/sku_catalog.csv")]
    pub catalog: PathBuf,

    /// Routine-style content CSV (one row per routine step)
    #[arg(long, default_value = "data/routine_per_video.csv")]
    pub routine: PathBuf,

    /// Mention-style content CSV, used when no routine export exists
    #[arg(long, default_value = "data/mentions.csv")]
    pub mentions: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Match a kit CSV against the catalog and print the match table
    Match {
        kit: PathBuf,
        #[arg(short = 's', long = "min-score", default_value = "70")]
        min_score: u32,
        #[arg(long)]
        json: bool,
    },
    /// Full run: match the kit, rank videos, list complementary products
    Rank {
        kit: PathBuf,
        #[arg(short = 's', long = "min-score", default_value = "70")]
        min_score: u32,
        #[arg(short = 'n', long, default_value = "30")]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Print a kit CSV template to stdout
    Template,
}
