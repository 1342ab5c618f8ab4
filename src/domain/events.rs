//! Domain events for the application.
//!
//! Events are sent via the event bus and streamed to clients over SSE, where
//! the front end turns them into toast notifications.

use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum NotificationEvent {
    BattlerCreated {
        battler_id: i32,
        name: String,
    },
    BattlerDeleted {
        battler_id: i32,
    },

    AnalyticsRefreshed {
        views: usize,
        duration_ms: u64,
    },

    NewsPipelineStarted,
    NewsPipelinePhase {
        phase: u8,
        name: String,
    },
    NewsPipelineFinished {
        articles: usize,
    },
    NewsPipelineFailed {
        message: String,
    },

    Error {
        message: String,
    },
    Info {
        message: String,
    },
}
