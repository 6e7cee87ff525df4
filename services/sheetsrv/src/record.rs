//! Podcast outreach records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outreach pipeline stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseStatus {
    #[default]
    #[serde(rename = "Not Contacted")]
    NotContacted,
    #[serde(rename = "Outreach Sent")]
    OutreachSent,
    #[serde(rename = "Follow Up Sent")]
    FollowUpSent,
    #[serde(rename = "In Conversation")]
    InConversation,
    Confirmed,
    Declined,
    #[serde(rename = "No Response")]
    NoResponse,
}

impl ResponseStatus {
    /// Pipeline order
    pub const ALL: [ResponseStatus; 7] = [
        Self::NotContacted,
        Self::OutreachSent,
        Self::FollowUpSent,
        Self::InConversation,
        Self::Confirmed,
        Self::Declined,
        Self::NoResponse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotContacted => "Not Contacted",
            Self::OutreachSent => "Outreach Sent",
            Self::FollowUpSent => "Follow Up Sent",
            Self::InConversation => "In Conversation",
            Self::Confirmed => "Confirmed",
            Self::Declined => "Declined",
            Self::NoResponse => "No Response",
        }
    }

    /// Exact, case-sensitive match against the display form
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl std::fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business fields of a podcast record
///
/// `response_status` stays textual: the sheet is free-form, and the store's
/// CHECK constraint is what rejects values outside [`ResponseStatus::ALL`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PodcastRecord {
    pub podcast_name: String,
    pub response_status: String,
    pub notes: Option<String>,
    pub client_notes: Option<String>,
    pub rating: Option<f64>,
    pub social_handle: Option<String>,
    pub monthly_listeners: Option<i64>,
    pub rep: Option<String>,
    pub recording_format: Option<String>,
    pub location: Option<String>,
    pub audience_niche: Option<String>,
    pub episode_url: Option<String>,
}

impl PodcastRecord {
    /// Record with only a name and the default status
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            podcast_name: name.into(),
            response_status: ResponseStatus::default().as_str().to_string(),
            notes: None,
            client_notes: None,
            rating: None,
            social_handle: None,
            monthly_listeners: None,
            rep: None,
            recording_format: None,
            location: None,
            audience_niche: None,
            episode_url: None,
        }
    }

    /// A record without a name is never stored
    pub fn has_name(&self) -> bool {
        !self.podcast_name.is_empty()
    }
}

/// A record as persisted, with its identifier and timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredPodcast {
    pub id: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub record: PodcastRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
