use serde::Deserialize;

const DELIMITER: &str = "||";

/// The monthly AI report, split into its two display fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub summary: String,
    pub advice: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReportResponse {
    pub report: String,
}

impl Report {
    /// Split `"<summary> || <advice>"` on the first delimiter. Text without a
    /// delimiter is all summary.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(DELIMITER) {
            Some((summary, advice)) => Self {
                summary: summary.trim().to_string(),
                advice: advice.trim().to_string(),
            },
            None => {
                tracing::warn!("report has no '{DELIMITER}' delimiter; showing it as summary only");
                Self {
                    summary: raw.trim().to_string(),
                    advice: String::new(),
                }
            }
        }
    }
}
