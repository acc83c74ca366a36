use thiserror::Error;

/// Failures of the fetch/parse half of the pipeline.
///
/// The orchestrator decides scope from the variant: `Fetch` and
/// `TableNotFound` make the whole league page unusable, `MalformedRow` only
/// spoils the table it was found in.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("fetch {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetch {url} failed: http {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("table '{table_id}' not found")]
    TableNotFound { table_id: String },

    #[error("table '{table_id}' row {row_index}: {reason}")]
    MalformedRow {
        table_id: String,
        row_index: usize,
        reason: String,
    },

    #[error("invalid selector '{0}'")]
    Selector(String),
}

impl ScrapeError {
    /// Errors after which the rest of the league page is not worth reading.
    pub fn aborts_league(&self) -> bool {
        matches!(
            self,
            ScrapeError::Fetch { .. }
                | ScrapeError::HttpStatus { .. }
                | ScrapeError::TableNotFound { .. }
                | ScrapeError::Selector(_)
        )
    }

    pub(crate) fn malformed(table_id: &str, row_index: usize, reason: impl Into<String>) -> Self {
        ScrapeError::MalformedRow {
            table_id: table_id.to_string(),
            row_index,
            reason: reason.into(),
        }
    }
}
