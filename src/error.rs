use std::path::PathBuf;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Configuration key or path that caused the error (e.g., "base_url", "segment[3]")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected value, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "probe", "fetch", "merge")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Coarse classification of [`Error`], stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NetworkUnavailable,
    EmptyText,
    RequestFailed,
    IoFailure,
    MalformedAudio,
    FormatMismatch,
    NoAudio,
    Playback,
    Configuration,
}

/// Unified error type for the TTS client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("TTS engine not available: connectivity probe failed")]
    NetworkUnavailable,

    #[error("Nothing to synthesize: text is empty after normalization")]
    EmptyText,

    #[error("TTS request failed{}: {message}", format_status(.status))]
    RequestFailed {
        /// HTTP status when the server answered; `None` for transport failures and timeouts.
        status: Option<u16>,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed audio: {0}")]
    Audio(#[from] hound::Error),

    #[error("Audio format mismatch in {}: expected {expected}, found {found}", .path.display())]
    FormatMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("No audio produced: all {segments} segment(s) failed (last error: {last})")]
    NoAudio { segments: usize, last: Box<Error> },

    #[error("Playback failed: {message}")]
    Playback { message: String },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },
}

fn format_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {})", code),
        None => String::new(),
    }
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn request_failed(status: Option<u16>, msg: impl Into<String>) -> Self {
        Error::RequestFailed {
            status,
            message: msg.into(),
        }
    }

    pub fn playback(msg: impl Into<String>) -> Self {
        Error::Playback {
            message: msg.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NetworkUnavailable => ErrorKind::NetworkUnavailable,
            Error::EmptyText => ErrorKind::EmptyText,
            Error::RequestFailed { .. } => ErrorKind::RequestFailed,
            Error::Io(_) => ErrorKind::IoFailure,
            Error::Audio(hound::Error::IoError(_)) => ErrorKind::IoFailure,
            Error::Audio(_) => ErrorKind::MalformedAudio,
            Error::FormatMismatch { .. } => ErrorKind::FormatMismatch,
            Error::NoAudio { .. } => ErrorKind::NoAudio,
            Error::Playback { .. } => ErrorKind::Playback,
            Error::Configuration { .. } => ErrorKind::Configuration,
        }
    }

    /// HTTP status of a rejected request, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::RequestFailed { status, .. } => *status,
            Error::NoAudio { last, .. } => last.status(),
            _ => None,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }
}
