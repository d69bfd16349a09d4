//! # Error Classifier
//!
//! Maps a [`RemoteError`] onto an [`ErrorKind`]. Remote APIs do not expose a
//! structured not-found code for every operation, so classification leans on
//! message markers. The markers are data ([`ErrorMarkers`]) supplied by each
//! step; the classifier only defines the priority order:
//!
//! 1. not found (code, 404 status or marker)
//! 2. already exists (code or marker)
//! 3. client-side validation failure
//! 4. throttling
//! 5. everything else

use crate::error::{ErrorKind, RemoteError};

const NOT_FOUND_CODES: &[&str] = &[
    "ResourceNotFoundException",
    "NotFoundException",
    "NoSuchEntity",
];

const ALREADY_EXISTS_CODES: &[&str] = &[
    "ResourceAlreadyExistsException",
    "AlreadyExistsException",
    "ConflictException",
];

const VALIDATION_CODES: &[&str] = &[
    "ValidationException",
    "InvalidParameterException",
    "InvalidParameterValueException",
    "InvalidRequestException",
];

const THROTTLING_CODES: &[&str] = &[
    "ThrottlingException",
    "TooManyRequestsException",
    "RequestLimitExceeded",
];

const ACCESS_DENIED_CODES: &[&str] = &[
    "AccessDeniedException",
    "UnauthorizedOperation",
];

const NOT_FOUND: u16 = 404;
const TOO_MANY_REQUESTS: u16 = 429;

/// Per-operation message markers.
///
/// Matching is a case-insensitive substring search on the error message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMarkers {
    pub not_found: Vec<&'static str>,
    pub already_exists: Vec<&'static str>,
    pub access_denied: Vec<&'static str>,
    /// Step-specific markers that mean "nothing left to do here".
    pub benign: Vec<&'static str>,
}

impl ErrorMarkers {
    /// The markers most providers share.
    pub fn standard() -> Self {
        Self {
            not_found: vec!["not found", "does not exist"],
            already_exists: vec!["already exists", "already created"],
            access_denied: vec!["not authorized", "access denied"],
            benign: Vec::new(),
        }
    }

    pub fn with_not_found(mut self, marker: &'static str) -> Self {
        self.not_found.push(marker);
        self
    }

    pub fn with_already_exists(mut self, marker: &'static str) -> Self {
        self.already_exists.push(marker);
        self
    }

    pub fn with_access_denied(mut self, marker: &'static str) -> Self {
        self.access_denied.push(marker);
        self
    }

    pub fn with_benign(mut self, marker: &'static str) -> Self {
        self.benign.push(marker);
        self
    }

    /// True when the error message carries one of the benign markers.
    pub fn is_benign(&self, error: &RemoteError) -> bool {
        message_contains(&error.message, &self.benign)
    }

    /// True when the error is an authorization failure.
    pub fn is_access_denied(&self, error: &RemoteError) -> bool {
        code_in(error, ACCESS_DENIED_CODES) || message_contains(&error.message, &self.access_denied)
    }
}

/// Classify a remote failure. Pure function of the error and the markers.
pub fn classify(error: &RemoteError, markers: &ErrorMarkers) -> ErrorKind {
    if code_in(error, NOT_FOUND_CODES)
        || error.status == Some(NOT_FOUND)
        || message_contains(&error.message, &markers.not_found)
    {
        ErrorKind::NotFound
    } else if code_in(error, ALREADY_EXISTS_CODES)
        || message_contains(&error.message, &markers.already_exists)
    {
        ErrorKind::AlreadyExists
    } else if code_in(error, VALIDATION_CODES) {
        ErrorKind::InvalidArgument
    } else if code_in(error, THROTTLING_CODES) || error.status == Some(TOO_MANY_REQUESTS) {
        ErrorKind::Throttled
    } else {
        ErrorKind::GeneralFailure
    }
}

fn code_in(error: &RemoteError, table: &[&str]) -> bool {
    error.code().is_some_and(|code| table.contains(&code))
}

fn message_contains(message: &str, markers: &[&str]) -> bool {
    let message = message.to_ascii_lowercase();
    markers
        .iter()
        .any(|marker| message.contains(&marker.to_ascii_lowercase()))
}
