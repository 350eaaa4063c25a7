//! Error types for gstplay core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types
#[derive(Error, Debug)]
pub enum Error {
    // Input errors
    #[error("Could not open file {}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid locator: {0}")]
    InvalidLocator(String),

    #[error("No filename or uri specified")]
    NoInput,

    // Session errors
    #[error("Pipeline parse problem: {0}")]
    PipelineStart(String),

    #[error("Invalid session state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true for errors detected while validating user input.
    ///
    /// These are reported on the console and end the process; they never
    /// reach the session error channel.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::SourceUnreadable { .. } | Error::InvalidLocator(_) | Error::NoInput
        )
    }

    /// Process exit status for errors that terminate the program
    pub fn exit_code(&self) -> i32 {
        match self {
            // Missing input is not a failure in console mode
            Error::NoInput => 0,
            _ => 1,
        }
    }

    /// Returns the error code for logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::SourceUnreadable { .. } => "SOURCE_UNREADABLE",
            Error::InvalidLocator(_) => "INVALID_LOCATOR",
            Error::NoInput => "NO_INPUT",
            Error::PipelineStart(_) => "PIPELINE_START",
            Error::InvalidStateTransition { .. } => "INVALID_STATE",
            Error::Io(_) => "IO",
        }
    }
}
