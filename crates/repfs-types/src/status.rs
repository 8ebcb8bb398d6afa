use std::fmt;

/// Numeric status codes carried on every RPC result.
///
/// `NOT_FOUND` matches the host's `ENOENT`, `UNSUPPORTED` matches `ENOSYS`;
/// the remaining codes are repfs's own.
pub struct StatusCode;

impl StatusCode {
    pub const OK: u32 = 0;
    /// I/O failures, dial failures, malformed requests.
    pub const GENERIC: u32 = 1;
    /// Missing path or parent directory (ENOENT).
    pub const NOT_FOUND: u32 = 2;
    /// Operation reserved at the protocol level but not implemented (ENOSYS).
    pub const UNSUPPORTED: u32 = 38;
    /// Fewer replicas registered than a file placement needs.
    pub const INSUFFICIENT_REPLICAS: u32 = 101;
}

/// Human-readable name for a status code.
pub fn code_name(code: u32) -> &'static str {
    match code {
        StatusCode::OK => "OK",
        StatusCode::GENERIC => "Generic",
        StatusCode::NOT_FOUND => "NotFound",
        StatusCode::UNSUPPORTED => "Unsupported",
        StatusCode::INSUFFICIENT_REPLICAS => "InsufficientReplicas",
        _ => "Unknown",
    }
}

/// A status value carrying a code and optional message.
///
/// The `#[must_use]` attribute ensures callers do not silently ignore error
/// statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Status {
    code: u32,
    message: Option<String>,
}

impl Status {
    /// Create a status with just a code.
    pub fn new(code: u32) -> Self {
        Self {
            code,
            message: None,
        }
    }

    /// Create a status with a code and a descriptive message.
    pub fn with_message(code: u32, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(msg.into()),
        }
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Whether this status represents success (code == OK).
    pub fn is_ok(&self) -> bool {
        self.code == StatusCode::OK
    }

    /// Produce a description like `"NotFound(2) no such directory"`.
    pub fn describe(&self) -> String {
        match &self.message {
            Some(msg) => format!("{}({}) {}", code_name(self.code), self.code, msg),
            None => format!("{}({})", code_name(self.code), self.code),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl std::error::Error for Status {}

impl From<u32> for Status {
    fn from(code: u32) -> Self {
        Self::new(code)
    }
}

impl From<std::io::Error> for Status {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::GENERIC,
        };
        Self::with_message(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_ok() {
        let s = Status::new(StatusCode::OK);
        assert!(s.is_ok());
        assert_eq!(s.code(), 0);
        assert!(s.message().is_none());
        assert_eq!(s.describe(), "OK(0)");
    }

    #[test]
    fn test_status_with_message() {
        let s = Status::with_message(StatusCode::NOT_FOUND, "no such directory");
        assert!(!s.is_ok());
        assert_eq!(s.code(), 2);
        assert_eq!(s.message(), Some("no such directory"));
        assert_eq!(s.describe(), "NotFound(2) no such directory");
    }

    #[test]
    fn test_status_display() {
        let s = Status::new(StatusCode::INSUFFICIENT_REPLICAS);
        assert_eq!(format!("{}", s), "InsufficientReplicas(101)");
    }

    #[test]
    fn test_status_from_code() {
        let s: Status = StatusCode::UNSUPPORTED.into();
        assert_eq!(s.code(), 38);
    }

    #[test]
    fn test_status_from_io_error() {
        let not_found = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let s: Status = not_found.into();
        assert_eq!(s.code(), StatusCode::NOT_FOUND);

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let s: Status = denied.into();
        assert_eq!(s.code(), StatusCode::GENERIC);
        assert!(s.message().unwrap().contains("nope"));
    }

    #[test]
    fn test_status_is_error() {
        let s = Status::with_message(StatusCode::GENERIC, "boom");
        let e: &dyn std::error::Error = &s;
        assert!(e.to_string().contains("boom"));
    }
}
