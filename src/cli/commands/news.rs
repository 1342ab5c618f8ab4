//! News generation command handler

use crate::config::Config;
use crate::services::NewsError;
use crate::state::SharedState;

pub async fn cmd_news_generate(config: &Config) -> anyhow::Result<()> {
    if !config.news.enabled {
        println!("News pipeline is disabled.");
        println!();
        println!("Set [news] enabled = true and list accounts in config.toml.");
        return Ok(());
    }

    let state = SharedState::new(config.clone()).await?;

    println!("Running news pipeline for {} accounts...", config.news.accounts.len());

    let report = match state.news_service.generate().await {
        Ok(report) => report,
        Err(NewsError::NoAccounts) => {
            println!("No accounts configured under [news] accounts.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("{:-<70}", "");
    println!(
        "Accounts analyzed: {} | Videos summarized: {} | {} ms",
        report.accounts_analyzed, report.videos_summarized, report.duration_ms
    );
    println!();

    if report.articles.is_empty() {
        println!("No storylines found.");
        return Ok(());
    }

    for article in &report.articles {
        println!("• [{}] {}", article.id, article.title);
        if let Some(storyline) = &article.storyline {
            println!("  Storyline: {storyline}");
        }
    }
    println!();
    println!("✓ {} draft articles saved. Publish them from the admin API.", report.articles.len());

    Ok(())
}
