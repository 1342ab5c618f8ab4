//! Prompt templates for the news pipeline phases.
//!
//! Every template ends with the exact JSON shape expected back, wrapped in a
//! fenced block, which is what the extractor parses.

use std::fmt::Write;

use crate::clients::{SocialPost, VideoRef};

pub const SYSTEM: &str = "You are a staff writer for a battle rap news site. \
You read social posts and video transcripts from the battle rap scene and \
report on them accurately. Never invent events, quotes or results. \
Always answer with a single fenced ```json code block and nothing else.";

fn posts_block(posts: &[SocialPost]) -> String {
    posts.iter().fold(String::new(), |mut out, post| {
        let when = post.created_at.as_deref().unwrap_or("unknown date");
        let _ = writeln!(out, "- [{when}] {}", post.text.replace('\n', " "));
        out
    })
}

pub fn account_analysis(account: &str, posts: &[SocialPost]) -> String {
    format!(
        "Analyze the recent posts of the account @{account}.\n\
         Identify the battle rap topics they talk about: upcoming battles, results, \
         beefs, league news, announcements.\n\n\
         Posts:\n{posts}\n\
         Respond with:\n\
         ```json\n\
         {{\"account\": \"{account}\", \"topics\": [{{\"topic\": \"...\", \"summary\": \"...\", \"keywords\": [\"...\"]}}]}}\n\
         ```",
        posts = posts_block(posts),
    )
}

pub fn cross_account(analyses_json: &str) -> String {
    format!(
        "Below are topic analyses of several accounts in the battle rap scene.\n\
         Find the topics shared by more than one account and list every other \
         account handle that is mentioned in them but was not analyzed.\n\n\
         Analyses:\n{analyses_json}\n\n\
         Respond with:\n\
         ```json\n\
         {{\"shared_topics\": [{{\"topic\": \"...\", \"accounts\": [\"...\"], \"keywords\": [\"...\"], \"summary\": \"...\"}}], \
         \"mentioned_accounts\": [\"...\"]}}\n\
         ```"
    )
}

pub fn video_summary(video: &VideoRef, topic_hint: &str, transcript: &str) -> String {
    format!(
        "Summarize the parts of this video transcript that relate to: {topic_hint}.\n\
         Video: \"{title}\" by {channel}.\n\n\
         Transcript:\n{transcript}\n\n\
         Respond with:\n\
         ```json\n\
         {{\"summary\": \"...\", \"key_points\": [\"...\"]}}\n\
         ```",
        title = video.title,
        channel = video.channel,
    )
}

pub fn storylines(context_json: &str) -> String {
    format!(
        "Using the account analyses, shared topics and video summaries below, \
         consolidate the material into distinct news storylines. Merge duplicates, \
         drop anything unsupported by the sources.\n\n\
         Material:\n{context_json}\n\n\
         Respond with:\n\
         ```json\n\
         {{\"storylines\": [{{\"title\": \"...\", \"summary\": \"...\", \"key_points\": [\"...\"], \"sources\": [\"...\"]}}]}}\n\
         ```"
    )
}

pub fn article(storyline_json: &str) -> String {
    format!(
        "Write a news article for this storyline. Use a neutral, informed tone, \
         400 to 700 words of Markdown, and attribute claims to their sources.\n\n\
         Storyline:\n{storyline_json}\n\n\
         Respond with:\n\
         ```json\n\
         {{\"title\": \"...\", \"summary\": \"...\", \"content\": \"...\", \"tags\": [\"...\"]}}\n\
         ```"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_prompt_lists_posts() {
        let posts = vec![SocialPost {
            id: "1".into(),
            text: "Main event\nconfirmed".into(),
            created_at: Some("2026-01-01".into()),
        }];
        let prompt = account_analysis("urltv", &posts);
        assert!(prompt.contains("@urltv"));
        assert!(prompt.contains("- [2026-01-01] Main event confirmed"));
        assert!(prompt.contains("```json"));
    }
}
