//! Error type shared by every stage of the report pipeline.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Boxed error used where a stage wraps failures from several libraries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Convenience alias used throughout the crate.
pub type Result<T, E = ReportError> = std::result::Result<T, E>;

/// Failures that can end a single report run.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The sales data file is missing, unreadable, or does not match the expected columns.
    #[error("malformed or missing sales data at {}", path.display())]
    DataFormat {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The loaded table has no records, so no summary can be computed.
    #[error("sales table is empty; nothing to summarize")]
    EmptyDataset,

    /// A revenue or unit total does not fit in 64 bits.
    #[error("{field} total exceeds the supported range")]
    TotalOverflow { field: &'static str },

    /// Building the PDF or writing it to disk failed.
    #[error("failed to render report ({context})")]
    Render {
        context: String,
        #[source]
        source: BoxError,
    },

    /// The mail relay rejected the configured credentials.
    #[error("mail relay rejected the credentials for {username}")]
    Authentication {
        username: String,
        #[source]
        source: lettre::transport::smtp::Error,
    },

    /// The message could not be built or handed to the mail relay.
    #[error("failed to deliver report to {recipient}")]
    Delivery {
        recipient: String,
        #[source]
        source: BoxError,
    },

    /// Configuration could not be loaded or is incomplete.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A filesystem operation outside the data and render stages failed.
    #[error("i/o error at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ReportError {
    pub(crate) fn data_format(path: &Path, source: impl Into<csv::Error>) -> Self {
        Self::DataFormat {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }

    pub(crate) fn render(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Render {
            context: context.into(),
            source: source.into(),
        }
    }

    pub(crate) fn delivery(recipient: &str, source: impl Into<BoxError>) -> Self {
        Self::Delivery {
            recipient: recipient.to_owned(),
            source: source.into(),
        }
    }

    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Joins an error and its `source()` chain into one line for logging.
pub fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut current = error.source();
    while let Some(source) = current {
        message.push_str(": ");
        message.push_str(&source.to_string());
        current = source.source();
    }
    message
}
