//! The error and signal types raised while matching and building URLs.
//!
//! Configuration mistakes (unknown converters, malformed patterns,
//! conflicting rules) are reported as `failure::Error` at the moment a
//! rule is added to a [`Map`], and never reach match time. The types in
//! this module cover the *expected* outcomes of matching and building:
//! the caller needs to distinguish "redirect to the canonical URL" from
//! "genuinely absent" from "present but wrong method" to produce correct
//! HTTP semantics, so every outcome is a separate variant rather than a
//! boolean failure.
//!
//! [`Map`]: ../map/struct.Map.html

use {
    failure::Fail,
    http::{Method, StatusCode},
    std::fmt,
};

/// The reasons why a request tuple does not resolve to a rule.
///
/// `RequestRedirect` is not a failure: it instructs the caller to send
/// the client to the canonical form of the requested URL. The router
/// never follows redirects itself.
#[derive(Debug, Clone, PartialEq, Fail)]
pub enum MatchError {
    /// No rule shape matches the requested path.
    #[fail(display = "no rule matches the requested path")]
    NotFound,

    /// A rule matches the path, but not the requested method.
    ///
    /// `allowed` is the union of the methods accepted by every rule with
    /// the matching shape, sorted, suitable for an `Allow` header.
    #[fail(display = "the requested method is not allowed for this path")]
    MethodNotAllowed { allowed: Vec<Method> },

    /// A rule matches the path and method, but expects the opposite
    /// websocket upgrade state.
    #[fail(display = "the matched rule expects a different connection upgrade")]
    WebsocketMismatch,

    /// The request should be answered with a redirect to `location`.
    #[fail(display = "the canonical location of the requested URL is {}", location)]
    RequestRedirect { location: String, status: StatusCode },
}

impl MatchError {
    /// The accumulated `Allow` list, if this error is `MethodNotAllowed`.
    pub fn allowed_methods(&self) -> Option<&[Method]> {
        match self {
            MatchError::MethodNotAllowed { allowed } => Some(allowed),
            _ => None,
        }
    }
}

/// The reasons why `MapAdapter::build` cannot produce a URL.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildError {
    /// No rule is registered under the requested endpoint. `suggestion`
    /// carries the closest known endpoint, if any exists.
    UnknownEndpoint {
        endpoint: String,
        suggestion: Option<String>,
    },

    /// Rules exist for the endpoint, but none can be built from the
    /// provided values. `missing` is the smallest set of variable names
    /// that would complete one of the candidates.
    MissingValues {
        endpoint: String,
        missing: Vec<String>,
    },

    /// A converter rejected one of the provided values with a
    /// descriptive message (e.g. a value outside an enumerated set).
    InvalidValue { endpoint: String, message: String },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::UnknownEndpoint {
                endpoint,
                suggestion,
            } => {
                write!(
                    f,
                    "could not build a URL for the unknown endpoint {:?}",
                    endpoint
                )?;
                if let Some(suggestion) = suggestion {
                    write!(f, ". Did you mean {:?} instead?", suggestion)?;
                }
                Ok(())
            }
            BuildError::MissingValues { endpoint, missing } => write!(
                f,
                "could not build a URL for the endpoint {:?}. Did you forget to specify values {:?}?",
                endpoint, missing
            ),
            BuildError::InvalidValue { endpoint, message } => write!(
                f,
                "could not build a URL for the endpoint {:?}: {}",
                endpoint, message
            ),
        }
    }
}

impl Fail for BuildError {}

/// Raised by a converter when a captured segment does not represent a
/// valid value. Caught by the matcher, which treats the candidate rule
/// as not matching; never propagated to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Fail)]
#[fail(display = "the value does not satisfy the converter")]
pub struct ValidationError;

/// Raised by a converter asked to render a value into a URL fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildValueError {
    /// The value cannot be rendered by this rule; the builder moves on
    /// to the next candidate rule for the endpoint.
    Mismatch,
    /// The value is wrong in a way worth reporting to the caller, such
    /// as not being a member of an enumerated converter's set.
    Invalid(String),
}
