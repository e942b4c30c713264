use std::path::PathBuf;
use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `job-link-logger`.
///
/// Each collaborator (config, mailbox, stores, message model) defines its own
/// variant. `Config::load` and `run` return it; the binary adds `anyhow`
/// context on top.
#[derive(Debug, Error)]
pub enum LoggerError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Mailbox ─────────────────────────────────────────────────────────
    #[error("mailbox: {0}")]
    Mailbox(#[from] MailboxError),

    // ── Sheet / state stores ────────────────────────────────────────────
    #[error("store: {0}")]
    Store(#[from] StoreError),

    // ── Message model ───────────────────────────────────────────────────
    #[error("message: {0}")]
    Message(#[from] MessageError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("could not determine home directory")]
    NoHome,
}

// ─── Mailbox errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum MailboxError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("OAuth redirect listener: {0}")]
    Listener(#[source] std::io::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

// ─── Store errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unreadable workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::XlsxError,
    },

    #[error("failed to build workbook {path}: {source}")]
    WorkbookWrite {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("sheet {path} has no `{sheet}` sheet")]
    MissingSheet { path: PathBuf, sheet: String },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// ─── Message errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("message {id} has no payload")]
    MissingPayload { id: String },
}

pub type Result<T> = std::result::Result<T, LoggerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subsystem_errors_convert_into_top_level() {
        let err: LoggerError = MessageError::MissingPayload { id: "abc".into() }.into();
        assert_eq!(err.to_string(), "message: message abc has no payload");

        let err: LoggerError = ConfigError::Validation("days must be positive".into()).into();
        assert!(matches!(err, LoggerError::Config(_)));
    }

    #[test]
    fn store_io_names_the_path() {
        let err = StoreError::io(
            "/tmp/processed.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/processed.json"));
    }
}
