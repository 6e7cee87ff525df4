//! SQLite DDL

/// Podcast outreach records
pub const PODCASTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS podcasts (
        id TEXT PRIMARY KEY,
        podcast_name TEXT NOT NULL CHECK (podcast_name <> ''),
        response_status TEXT NOT NULL DEFAULT 'Not Contacted'
            CHECK (response_status IN (
                'Not Contacted',
                'Outreach Sent',
                'Follow Up Sent',
                'In Conversation',
                'Confirmed',
                'Declined',
                'No Response'
            )),
        notes TEXT,
        client_notes TEXT,
        rating REAL,
        social_handle TEXT,
        monthly_listeners INTEGER,
        rep TEXT,
        recording_format TEXT,
        location TEXT,
        audience_niche TEXT,
        episode_url TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
"#;

pub const PODCASTS_NAME_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_podcasts_name ON podcasts(podcast_name COLLATE BINARY, id)
"#;

/// Runtime-editable site settings
pub const SITE_SETTINGS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS site_settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
"#;

/// Statements applied at startup, in order
pub const ALL: [&str; 3] = [PODCASTS_TABLE, PODCASTS_NAME_INDEX, SITE_SETTINGS_TABLE];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ResponseStatus;

    #[test]
    fn test_status_check_lists_every_status() {
        for status in ResponseStatus::ALL {
            assert!(PODCASTS_TABLE.contains(&format!("'{}'", status.as_str())));
        }
    }
}
