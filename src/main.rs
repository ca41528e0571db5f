use clap::Parser;
use kitmatch::cli::{Cli, Commands};
use kitmatch::content::{ContentMention, watch_url};
use kitmatch::matcher::MatchOutcome;
use kitmatch::pipeline::{Pipeline, PipelineConfig, Report, ReportOutcome};

fn main() -> kitmatch::Result<()> {
    kitmatch::trace::init();
    let cli = Cli::parse();

    let mut pipeline = Pipeline::new(PipelineConfig {
        catalog: cli.catalog,
        routine: cli.routine,
        mentions: cli.mentions,
    });

    match cli.command {
        Commands::Template => print!("{}", kitmatch::kit::TEMPLATE_CSV),
        Commands::Match {
            kit,
            min_score,
            json,
        } => {
            let outcome = pipeline.match_kit(&kit, min_score)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                render_matches(&outcome, min_score);
            }
        }
        Commands::Rank {
            kit,
            min_score,
            limit,
            json,
        } => {
            let report = pipeline.run(&kit, min_score, limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                render_report(&report, min_score);
            }
        }
    }
    Ok(())
}

fn render_matches(outcome: &MatchOutcome, min_score: u32) {
    println!(
        "Items recognized: {} of {} (min score {})",
        outcome.accepted.len(),
        outcome.all.len(),
        min_score
    );
    for m in &outcome.all {
        let status = if m.score >= min_score { "ok  " } else { "skip" };
        if m.matched_product_name.is_empty() {
            println!("  {} {:>3}  {} — {}  (no candidate)", status, m.score, m.brand, m.product_name);
        } else {
            println!(
                "  {} {:>3}  {} — {}  ->  {} — {}",
                status, m.score, m.brand, m.product_name, m.matched_brand, m.matched_product_name
            );
        }
    }
}

fn render_report(report: &Report, min_score: u32) {
    render_matches(&report.matches, min_score);
    println!("\nData source: {}", report.source.label());

    match &report.outcome {
        ReportOutcome::NoOverlap => {
            println!(
                "No overlaps between your kit and detected products yet. \
                 Try lowering the match score or expanding catalog coverage."
            );
        }
        ReportOutcome::Ranked { videos } => {
            for video in videos {
                let r = &video.ranking;
                println!("\n{}  [{}]", r.title, video.url);
                println!(
                    "  coverage {:.0}%  items {}  steps {}  score {:.3}",
                    r.coverage * 100.0,
                    r.used_items,
                    r.used_steps,
                    r.score
                );

                println!("  Your kit items in this video:");
                for m in &video.kit_hits {
                    println!("    {}", mention_line(m));
                }

                if !video.complements.is_empty() {
                    println!("  Complementary products:");
                    for m in &video.complements {
                        println!("    {}", mention_line(m));
                    }
                }
            }
        }
    }
}

fn mention_line(m: &ContentMention) -> String {
    let mut meta = String::new();
    if !m.step.is_empty() {
        meta.push_str(&format!("{} · ", m.step));
    }
    if !m.product_type.is_empty() {
        meta.push_str(&format!("{} · ", m.product_type));
    }
    if !m.shade.is_empty() {
        meta.push_str(&format!("Shade: {} · ", m.shade));
    }
    let jump = match m.seconds {
        Some(sec) => format!("{}s", sec as i64),
        None => "open".to_string(),
    };
    format!(
        "{} — {}  ({}{})  {}",
        m.brand,
        m.product,
        meta,
        jump,
        watch_url(&m.video_id, m.seconds)
    )
}
