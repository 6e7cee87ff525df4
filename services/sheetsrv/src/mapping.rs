//! Fixed column layout between sheet rows and podcast records
//!
//! ```text
//! A podcast_name   B response_status  C notes          D client_notes
//! E rating         F social_handle    G monthly_listeners
//! H rep            I recording_format J location       K audience_niche
//! L episode_url    M id
//! ```

use tracing::warn;

use crate::record::{PodcastRecord, ResponseStatus};

/// Columns A through M
pub const COLUMN_COUNT: usize = 13;

/// Zero-based index of the identifier column (M)
pub const ID_COLUMN: usize = 12;

pub const NAME: usize = 0;
pub const RESPONSE_STATUS: usize = 1;
pub const NOTES: usize = 2;
pub const CLIENT_NOTES: usize = 3;
pub const RATING: usize = 4;
pub const SOCIAL_HANDLE: usize = 5;
pub const MONTHLY_LISTENERS: usize = 6;
pub const REP: usize = 7;
pub const RECORDING_FORMAT: usize = 8;
pub const LOCATION: usize = 9;
pub const AUDIENCE_NICHE: usize = 10;
pub const EPISODE_URL: usize = 11;

/// Header row (position 1) of a fresh sheet
pub const HEADER: [&str; COLUMN_COUNT] = [
    "Podcast Name",
    "Response Status",
    "Notes",
    "Client Notes",
    "Rating",
    "Social Handle",
    "Monthly Listeners",
    "Rep",
    "Recording Format",
    "Location",
    "Audience Niche",
    "Episode URL",
    "ID",
];

/// Trimmed cell; cells past the end of a short row read as empty
fn cell<S: AsRef<str>>(cells: &[S], index: usize) -> &str {
    cells.get(index).map(|c| c.as_ref().trim()).unwrap_or("")
}

fn optional_text<S: AsRef<str>>(cells: &[S], index: usize) -> Option<String> {
    let value = cell(cells, index);
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_rating(value: &str) -> Option<f64> {
    if value.is_empty() {
        return None;
    }
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(n),
        _ => {
            warn!("Ignoring non-numeric rating '{}'", value);
            None
        },
    }
}

fn parse_listeners(value: &str) -> Option<i64> {
    if value.is_empty() {
        return None;
    }
    if let Ok(n) = value.parse::<i64>() {
        return Some(n);
    }
    // "12000.0" or "1.2e4" are whole numbers written differently
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 => Some(n as i64),
        _ => {
            warn!("Ignoring non-integer monthly listeners '{}'", value);
            None
        },
    }
}

/// Map a sheet row to a record
///
/// Every cell is trimmed. Empty optional cells become `None`, an empty
/// status becomes `Not Contacted`, and unparseable numbers become `None`.
/// The name may be empty; callers decide whether to skip.
pub fn row_to_record<S: AsRef<str>>(cells: &[S]) -> PodcastRecord {
    let status = cell(cells, RESPONSE_STATUS);

    PodcastRecord {
        podcast_name: cell(cells, NAME).to_string(),
        response_status: if status.is_empty() {
            ResponseStatus::default().as_str().to_string()
        } else {
            status.to_string()
        },
        notes: optional_text(cells, NOTES),
        client_notes: optional_text(cells, CLIENT_NOTES),
        rating: parse_rating(cell(cells, RATING)),
        social_handle: optional_text(cells, SOCIAL_HANDLE),
        monthly_listeners: parse_listeners(cell(cells, MONTHLY_LISTENERS)),
        rep: optional_text(cells, REP),
        recording_format: optional_text(cells, RECORDING_FORMAT),
        location: optional_text(cells, LOCATION),
        audience_niche: optional_text(cells, AUDIENCE_NICHE),
        episode_url: optional_text(cells, EPISODE_URL),
    }
}

/// Map a record and its identifier to a full 13-cell row
pub fn record_to_row(record: &PodcastRecord, id: &str) -> Vec<String> {
    fn text(value: &Option<String>) -> String {
        value.clone().unwrap_or_default()
    }

    vec![
        record.podcast_name.clone(),
        record.response_status.clone(),
        text(&record.notes),
        text(&record.client_notes),
        record.rating.map(|r| r.to_string()).unwrap_or_default(),
        text(&record.social_handle),
        record
            .monthly_listeners
            .map(|n| n.to_string())
            .unwrap_or_default(),
        text(&record.rep),
        text(&record.recording_format),
        text(&record.location),
        text(&record.audience_niche),
        text(&record.episode_url),
        id.to_string(),
    ]
}

/// Identifier in column M, if the row has been reconciled before
pub fn row_identifier<S: AsRef<str>>(cells: &[S]) -> Option<String> {
    optional_text(cells, ID_COLUMN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_full_row() {
        let cells = row(&[
            " Soil Stories ",
            "Confirmed",
            "Great fit",
            "",
            "4.5",
            "@soil",
            "12000",
            "Ana",
            "Video",
            "Remote",
            "Agroecology",
            "https://example.org/ep1",
            "abc-123",
        ]);
        let record = row_to_record(&cells);

        assert_eq!(record.podcast_name, "Soil Stories");
        assert_eq!(record.response_status, "Confirmed");
        assert_eq!(record.notes.as_deref(), Some("Great fit"));
        assert_eq!(record.client_notes, None);
        assert_eq!(record.rating, Some(4.5));
        assert_eq!(record.monthly_listeners, Some(12000));
        assert_eq!(record.episode_url.as_deref(), Some("https://example.org/ep1"));
        assert_eq!(row_identifier(&cells).as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_empty_status_defaults() {
        let record = row_to_record(&row(&["Roots Radio", "   "]));
        assert_eq!(record.response_status, "Not Contacted");
    }

    #[test]
    fn test_short_row_reads_as_empty() {
        let cells = row(&["Roots Radio"]);
        let record = row_to_record(&cells);
        assert_eq!(record, PodcastRecord::named("Roots Radio"));
        assert_eq!(row_identifier(&cells), None);
    }

    #[test]
    fn test_blank_identifier_is_none() {
        let mut cells = vec![String::new(); COLUMN_COUNT];
        cells[ID_COLUMN] = "   ".to_string();
        assert_eq!(row_identifier(&cells), None);
    }

    #[test]
    fn test_unparseable_numbers_become_none() {
        let cells = row(&["X", "", "", "", "five", "", "lots"]);
        let record = row_to_record(&cells);
        assert_eq!(record.rating, None);
        assert_eq!(record.monthly_listeners, None);

        let cells = row(&["X", "", "", "", "NaN", "", "inf"]);
        let record = row_to_record(&cells);
        assert_eq!(record.rating, None);
        assert_eq!(record.monthly_listeners, None);
    }

    #[test]
    fn test_whole_float_listeners() {
        let cells = row(&["X", "", "", "", "", "", "12000.0"]);
        assert_eq!(row_to_record(&cells).monthly_listeners, Some(12000));
        let cells = row(&["X", "", "", "", "", "", "1.5"]);
        assert_eq!(row_to_record(&cells).monthly_listeners, None);
    }

    #[test]
    fn test_record_to_row_layout() {
        let mut record = PodcastRecord::named("Roots Radio");
        record.rating = Some(4.0);
        record.monthly_listeners = Some(800);
        record.location = Some("Lisbon".to_string());

        let cells = record_to_row(&record, "id-9");
        assert_eq!(cells.len(), COLUMN_COUNT);
        assert_eq!(cells[NAME], "Roots Radio");
        assert_eq!(cells[RESPONSE_STATUS], "Not Contacted");
        assert_eq!(cells[RATING], "4");
        assert_eq!(cells[MONTHLY_LISTENERS], "800");
        assert_eq!(cells[LOCATION], "Lisbon");
        assert_eq!(cells[NOTES], "");
        assert_eq!(cells[ID_COLUMN], "id-9");
    }

    #[test]
    fn test_mapping_is_idempotent() {
        let inputs = [
            row(&[" A ", "", "n", "", " 3.25 ", "", "100", "", "", "", "", "", ""]),
            row(&["B", "Declined", "", "", "x", "", "1e3"]),
            row(&[""]),
            row(&["C", "Not a status", "", "", "0", "", "-5", "r", "f", "l", "a", "u", "id"]),
        ];

        for cells in inputs {
            let once = row_to_record(&cells);
            let twice = row_to_record(&record_to_row(&once, "ignored"));
            assert_eq!(once, twice);
        }
    }
}
