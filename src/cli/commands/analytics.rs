//! Analytics refresh and leaderboard command handlers

use crate::config::Config;
use crate::domain::Category;
use crate::services::LeaderboardQuery;
use crate::state::SharedState;

pub async fn cmd_refresh_analytics(config: &Config) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;

    println!("Refreshing analytics views...");
    let report = state.analytics_service.refresh().await?;

    println!("{:-<70}", "");
    for view in &report.views {
        println!(
            "  {:<32} {:>8} rows  {:>6} ms",
            view.view, view.row_count, view.duration_ms
        );
    }
    println!("{:-<70}", "");
    println!("✓ Refreshed {} views in {} ms", report.views.len(), report.duration_ms);

    Ok(())
}

pub async fn cmd_leaderboard(
    config: &Config,
    category: Option<Category>,
    limit: u64,
) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;

    let query = LeaderboardQuery {
        category,
        min_ratings: None,
        limit: Some(limit),
    };
    let entries = state.analytics_service.leaderboard(&query).await?;

    if entries.is_empty() {
        println!("No rated battlers yet.");
        println!();
        println!("Ratings appear here once battlers have been scored.");
        return Ok(());
    }

    let heading = category.map_or("Total", |c| c.as_str());
    println!("Leaderboard by {heading} ({} shown)", entries.len());
    println!("{:-<70}", "");
    println!(
        "{:>4}  {:<24} {:>7} {:>7} {:>7} {:>7} {:>7}",
        "#", "Battler", "Score", "Write", "Perf", "Pers", "Ratings"
    );

    for entry in entries {
        println!(
            "{:>4}  {:<24} {:>7.2} {:>7.2} {:>7.2} {:>7.2} {:>7}",
            entry.rank,
            truncate(&entry.name, 24),
            entry.score,
            entry.writing,
            entry.performance,
            entry.personal,
            entry.rating_count
        );
    }

    Ok(())
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        return name.to_string();
    }
    let mut cut: String = name.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_short_names() {
        assert_eq!(truncate("Loaded Lux", 24), "Loaded Lux");
        assert_eq!(truncate("abcdef", 4), "abc…");
    }
}
