use std::fmt;
use std::sync::Arc;

use stream_framework::ParseState;
use thiserror::Error;

use crate::suspend::PartialResult;

/// Why a parse failed.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// A token no expectation matched.
    #[error("unexpected {0}")]
    Unexpected(String),
    /// Input ran out where a token was required.
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    /// A combinator-declared expectation.
    #[error("{0}")]
    Message(String),
    /// An error that escaped user code or the underlying stream. Wrapped
    /// exactly once at the point it surfaced, then carried as a value.
    #[error("exception during parsing: {0}")]
    Exception(#[source] Arc<dyn std::error::Error + Send + Sync + 'static>),
}

impl ParseError {
    /// Wraps an arbitrary error as an exception failure.
    pub fn exception(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        ParseError::Exception(Arc::new(error))
    }
}

/// The outcome of running a parser: a value plus the state to resume from,
/// or an error plus the state at the failure point.
///
/// Both arms carry a state so that chaining never re-derives a position and
/// suspension can hand the remainder on, whatever the outcome was.
#[derive(Debug, Clone)]
pub enum ParseResult<T, S: ParseState> {
    Success { value: T, rest: S },
    Failure { error: ParseError, at: S },
}

impl<T, S: ParseState> ParseResult<T, S> {
    /// Destructures into exactly one of the two arms.
    pub fn case<R>(
        self,
        on_failure: impl FnOnce(ParseError, S) -> R,
        on_success: impl FnOnce(T, S) -> R,
    ) -> R {
        match self {
            ParseResult::Success { value, rest } => on_success(value, rest),
            ParseResult::Failure { error, at } => on_failure(error, at),
        }
    }

    /// Rewrites the success value; failures pass through untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ParseResult<U, S> {
        match self {
            ParseResult::Success { value, rest } => ParseResult::Success {
                value: f(value),
                rest,
            },
            ParseResult::Failure { error, at } => ParseResult::Failure { error, at },
        }
    }

    /// Re-types a failure to carry a different value type, preserving the
    /// error and the failure state. Returns `None` on success — a produced
    /// value cannot be converted, only mapped.
    pub fn convert<U>(self) -> Option<ParseResult<U, S>> {
        match self {
            ParseResult::Failure { error, at } => Some(ParseResult::Failure { error, at }),
            ParseResult::Success { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ParseResult::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ParseResult::Failure { .. })
    }

    /// The state carried by either arm: the resume state of a success, or
    /// the state at the failure point.
    pub fn state(&self) -> &S {
        match self {
            ParseResult::Success { rest, .. } => rest,
            ParseResult::Failure { at, .. } => at,
        }
    }

    /// Consumes the result, keeping only its state.
    pub fn into_state(self) -> S {
        match self {
            ParseResult::Success { rest, .. } => rest,
            ParseResult::Failure { at, .. } => at,
        }
    }

    /// The success value, discarding the resume state.
    pub fn ok(self) -> Option<T> {
        match self {
            ParseResult::Success { value, .. } => Some(value),
            ParseResult::Failure { .. } => None,
        }
    }

    /// The structured consumption path: value or error.
    pub fn into_result(self) -> Result<T, ParseError> {
        match self {
            ParseResult::Success { value, .. } => Ok(value),
            ParseResult::Failure { error, .. } => Err(error),
        }
    }

    /// Lowers this result into the suspend/resume protocol, pairing it
    /// with a handle over its own resume state.
    pub fn suspend(self) -> PartialResult<T, S> {
        PartialResult::new(self)
    }

    /// The loud consumption path: unwraps the value.
    ///
    /// # Panics
    ///
    /// Panics on a failure, with a message embedding the rendered position
    /// and the cause. Structured call-sites should `match` or use
    /// [`into_result`](Self::into_result) instead.
    pub fn value(self) -> T {
        match self {
            ParseResult::Success { value, .. } => value,
            ParseResult::Failure { error, at } => {
                panic!("parse failed at {}: {}", at.position(), render_cause(&error))
            }
        }
    }
}

impl<T: fmt::Debug, S: ParseState> fmt::Display for ParseResult<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseResult::Success { value, .. } => write!(f, "{value:?}"),
            ParseResult::Failure { error, at } => {
                write!(f, "parse failed at {}: {}", at.position(), render_cause(error))
            }
        }
    }
}

/// Renders an error with its cause chain, one `: `-separated hop per level.
fn render_cause(error: &ParseError) -> String {
    let mut text = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        let rendered = cause.to_string();
        if !text.ends_with(&rendered) {
            text.push_str(": ");
            text.push_str(&rendered);
        }
        source = cause.source();
    }
    text
}
