use std::fmt;
use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::position::TokenPosition;

/// An I/O error recorded by a resource-backed stream state.
///
/// Advancing a state is pure, so a read failure cannot surface at the point
/// of [`ParseState::advance`]; implementations record it, end the token
/// sequence, and the parse entry points pick it up through
/// [`ParseState::pending_error`].
#[derive(Debug, Clone, Error)]
#[error("stream read failed: {0}")]
pub struct StreamError(#[source] pub Arc<io::Error>);

impl From<io::Error> for StreamError {
    fn from(error: io::Error) -> Self {
        StreamError(Arc::new(error))
    }
}

/// An immutable cursor over a token sequence: "the remaining input starting
/// here", with one token of lookahead.
///
/// States are persistent values. [`advance`](ParseState::advance) returns
/// the successor without mutating the receiver, so the same state can be
/// advanced several times to attempt alternative continuations — that
/// property is what makes backtracking free for the combinators built on
/// top. Implementations that cannot honor it fully (one-pass iterators)
/// must say so.
pub trait ParseState: Clone + 'static {
    /// One atomic unit of input.
    type Token: Clone + fmt::Debug + 'static;

    /// The position type folded along this stream.
    type Position: TokenPosition<Self::Token>;

    /// Returns the token at this state, or `None` at end of input.
    fn current(&self) -> Option<Self::Token>;

    /// Returns the state advanced by exactly one token.
    ///
    /// Advancing at end of input returns an equivalent end state.
    fn advance(&self) -> Self;

    /// Returns the position of the current token.
    fn position(&self) -> Self::Position;

    /// Returns the number of tokens consumed before this state.
    fn offset(&self) -> usize;

    /// Returns true if there are no more tokens.
    fn is_eof(&self) -> bool {
        self.current().is_none()
    }

    /// Releases the underlying resource, if any.
    ///
    /// Idempotent; the default is a no-op for states that own nothing.
    fn dispose(&self) {}

    /// Returns an I/O error recorded while feeding this stream, if any.
    fn pending_error(&self) -> Option<StreamError> {
        None
    }
}
