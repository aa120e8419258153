use stream_framework::ParseState;

use crate::parser::Parser;
use crate::result::ParseResult;

/// A parse outcome paired with the live remainder of the input.
///
/// Produced by [`Parser::parse_partially`]; the remainder can be handed to
/// a different parser without re-reading or re-tokenizing what the first
/// parse already consumed.
#[derive(Debug)]
pub struct PartialResult<T, S: ParseState> {
    result: ParseResult<T, S>,
    rest: Tail<S>,
}

impl<T, S: ParseState> PartialResult<T, S> {
    pub(crate) fn new(result: ParseResult<T, S>) -> Self {
        let rest = Tail(result.state().clone());
        Self { result, rest }
    }

    /// The outcome of the partial parse.
    pub fn result(&self) -> &ParseResult<T, S> {
        &self.result
    }

    /// Splits into the outcome and the resumable remainder.
    pub fn into_parts(self) -> (ParseResult<T, S>, Tail<S>) {
        (self.result, self.rest)
    }
}

/// The unconsumed remainder of a partially parsed input.
///
/// The handle is affine: continuing or disposing consumes it, so a
/// remainder can be resumed at most once — the resource handoff the
/// suspend/resume protocol requires is enforced by moves rather than by a
/// runtime state flag.
#[derive(Debug)]
pub struct Tail<S: ParseState>(S);

impl<S: ParseState> Tail<S> {
    /// Runs `parser` from exactly where the previous parse stopped,
    /// yielding a fresh suspended result over the new remainder.
    pub fn continue_with<U: 'static>(self, parser: &Parser<S, U>) -> PartialResult<U, S> {
        parser.parse_partially(self.0)
    }

    /// Releases the underlying stream resource.
    pub fn dispose(self) {
        self.0.dispose()
    }

    /// The held state, for position and offset diagnostics.
    pub fn state(&self) -> &S {
        &self.0
    }
}
