use failure::Fail;
use std::{error::Error, fmt};

#[derive(Debug, Clone, PartialEq, Eq)]
/// An error raised by the tag registry, the extension table codec or the entry codec.
pub enum RegistryError {
    /// A predefined binding conflicts with an existing one.
    Configuration(String),
    /// Registering another dynamic type would exceed the tag space.
    Overflow(String),
    /// A type or tag is already bound to something else.
    Conflict(String),
    /// A type name could not be resolved through the catalog.
    Lookup(String),
    /// The incoming stream violates the table invariants.
    Protocol(String),
    /// The input ended early or held an unreadable value.
    Decode(String),
    /// A value cannot be represented on the wire.
    Encode(String),
    /// A precondition on an argument was violated.
    InvalidArgument(String),
}

impl RegistryError {
    /// The message associated with the error.
    pub fn message(&self) -> &str {
        use RegistryError::*;
        match self {
            Configuration(s) | Overflow(s) | Conflict(s) | Lookup(s) | Protocol(s)
            | Decode(s) | Encode(s) | InvalidArgument(s) => s,
        }
    }

    fn kind(&self) -> &'static str {
        use RegistryError::*;
        match self {
            Configuration(_) => "configuration error",
            Overflow(_) => "capacity overflow",
            Conflict(_) => "conflicting binding",
            Lookup(_) => "type lookup failed",
            Protocol(_) => "protocol error",
            Decode(_) => "decoding failed",
            Encode(_) => "encoding failed",
            InvalidArgument(_) => "invalid argument",
        }
    }
}

impl Error for RegistryError {}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.kind(), self.message())
    }
}

#[derive(Debug)]
/// An error encountered while copying a container through an in-memory buffer.
///
/// The failure that interrupted the copy is kept as the cause.
pub struct CopyError {
    cause: failure::Error,
}

impl CopyError {
    /// Wraps the failure that interrupted a copy.
    pub fn new(cause: failure::Error) -> Self { CopyError { cause } }

    /// The failure that interrupted the copy.
    pub fn inner(&self) -> &failure::Error { &self.cause }
}

impl Fail for CopyError {
    fn cause(&self) -> Option<&dyn Fail> { Some(self.cause.as_fail()) }
}

impl fmt::Display for CopyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid argument: map cannot be copied: {}", self.cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_kind() {
        let e = RegistryError::Overflow("too many".to_string());
        assert_eq!(e.to_string(), "capacity overflow: too many");
        assert_eq!(e.message(), "too many");
    }

    #[test]
    fn copy_error_keeps_cause() {
        let inner: failure::Error = RegistryError::Decode("short".to_string()).into();
        let e = CopyError::new(inner);

        let cause = Fail::cause(&e).unwrap();
        assert_eq!(
            cause.downcast_ref::<RegistryError>(),
            Some(&RegistryError::Decode("short".to_string()))
        );
        assert!(e.to_string().contains("short"));
    }
}
