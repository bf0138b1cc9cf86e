use serde::{Deserialize, Serialize};

/// Endpoint used when no other is configured.
pub const DEFAULT_SUMMARY_ENDPOINT: &str = "https://summarizer-backend-vwaw.onrender.com/api/file";

/// Name of the single multipart part carrying the document.
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Body returned by the summarizer on success. `summary` stays optional so a
/// missing field can be reported instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResponse {
    #[serde(default)]
    pub summary: Option<String>,
}

impl SummaryResponse {
    /// The summary text, treating an empty string as absent.
    pub fn into_summary(self) -> Option<String> {
        self.summary.filter(|summary| !summary.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_empty_summary_are_absent() {
        let missing: SummaryResponse = serde_json::from_str(r#"{"result":"ok"}"#).expect("parse");
        assert_eq!(missing.into_summary(), None);

        let empty: SummaryResponse = serde_json::from_str(r#"{"summary":""}"#).expect("parse");
        assert_eq!(empty.into_summary(), None);

        let present: SummaryResponse =
            serde_json::from_str(r#"{"summary":"X","extra":1}"#).expect("parse");
        assert_eq!(present.into_summary(), Some("X".to_string()));
    }
}
