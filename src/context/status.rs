use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum StatusCode {
    Ok = 0,
    Cancelled = 1,
    Unknown = 2,
    InvalidArgument = 3,
    DeadlineExceeded = 4,
    NotFound = 5,
    AlreadyExists = 6,
    PermissionDenied = 7,
    ResourceExhausted = 8,
    FailedPrecondition = 9,
    Aborted = 10,
    OutOfRange = 11,
    Unimplemented = 12,
    Internal = 13,
    Unavailable = 14,
    DataLoss = 15,
    Unauthenticated = 16,
}

/// Final status of a call, as reported by the transport alongside its trailers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    code: StatusCode,
    detail: String,
}

impl Status {
    pub fn new(code: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }

    pub fn ok() -> Self {
        Self::new(StatusCode::Ok, "")
    }

    /// Builds a status from a wire code. Codes outside the known range map to
    /// `StatusCode::Unknown`.
    pub fn from_code(code: u8, detail: impl Into<String>) -> Self {
        let code = StatusCode::try_from(code).unwrap_or(StatusCode::Unknown);
        Self::new(code, detail)
    }

    /// The numeric wire code.
    pub fn raw_code(&self) -> u8 {
        self.code.into()
    }

    pub fn cancelled(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::Cancelled, detail)
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn is_ok(&self) -> bool {
        self.code == StatusCode::Ok
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::ok()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            write!(f, "{:?}", self.code)
        } else {
            write!(f, "{:?}: {}", self.code, self.detail)
        }
    }
}
