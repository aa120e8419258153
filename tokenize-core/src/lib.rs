//! Tokenize Core
//!
//! A stream whose tokens are produced by repeatedly applying a parser to an
//! underlying stream: the two-phase lex/parse pipeline, run by the same
//! engine at both levels. The lexing parser plays the lexer; the resulting
//! [`TokenizedCursor`] is an ordinary stream state, so any token-level
//! parser can consume it with no engine support.

use std::fmt;

use combinator_framework::{ParseResult, Parser};
use stream_framework::{ParseState, StreamError, TokenPosition};

/// The position of a lexed token: the sub-stream position at the token's
/// start.
///
/// Folding a lexical token cannot advance the underlying position — that
/// already happened while the token was lexed — so `advance` is the
/// identity and the cursor re-reads positions from its inner stream.
pub struct LexPosition<S: ParseState>(pub S::Position);

impl<S: ParseState> Clone for LexPosition<S> {
    fn clone(&self) -> Self {
        LexPosition(self.0.clone())
    }
}

impl<S: ParseState> PartialEq for LexPosition<S> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<S: ParseState> PartialOrd for LexPosition<S> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl<S: ParseState> fmt::Debug for LexPosition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LexPosition").field(&self.0).finish()
    }
}

impl<S: ParseState> fmt::Display for LexPosition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl<S, T> TokenPosition<T> for LexPosition<S>
where
    S: ParseState,
{
    fn initial() -> Self {
        LexPosition(<S::Position as TokenPosition<S::Token>>::initial())
    }

    fn advance(&self, _token: &T) -> Self {
        self.clone()
    }
}

/// A stream state whose tokens are the outputs of a lexing parser applied
/// repeatedly to an underlying stream.
///
/// Each state holds the current lexed token, the inner position where it
/// started, and the inner remainder; advancing re-runs the lexer from the
/// remainder. When the lexer fails, the token stream ends — a trailing
/// failure is indistinguishable from end of input at this level, and the
/// token-level grammar reports it as such. Re-deriving a retained state
/// re-runs the lexer, so backtracking over tokenized input costs one lex
/// per re-derived token.
pub struct TokenizedCursor<S: ParseState, T: Clone + fmt::Debug + 'static> {
    lexer: Parser<S, T>,
    current: Option<T>,
    start: S::Position,
    rest: S,
    index: usize,
}

impl<S, T> TokenizedCursor<S, T>
where
    S: ParseState,
    T: Clone + fmt::Debug + 'static,
{
    /// Tokenizes `inner` with `lexer`, positioned at the first token.
    pub fn new(lexer: Parser<S, T>, inner: S) -> Self {
        Self::shift(lexer, inner, 0)
    }

    fn shift(lexer: Parser<S, T>, inner: S, index: usize) -> Self {
        let start = inner.position();
        match lexer.run(inner) {
            ParseResult::Success { value, rest } => Self {
                lexer,
                current: Some(value),
                start,
                rest,
                index,
            },
            ParseResult::Failure { at, .. } => Self {
                lexer,
                current: None,
                start,
                rest: at,
                index,
            },
        }
    }

    /// The inner state after the current token: the sub-stream remainder.
    pub fn inner(&self) -> &S {
        &self.rest
    }
}

impl<S, T> Clone for TokenizedCursor<S, T>
where
    S: ParseState,
    T: Clone + fmt::Debug + 'static,
{
    fn clone(&self) -> Self {
        Self {
            lexer: self.lexer.clone(),
            current: self.current.clone(),
            start: self.start.clone(),
            rest: self.rest.clone(),
            index: self.index,
        }
    }
}

impl<S, T> fmt::Debug for TokenizedCursor<S, T>
where
    S: ParseState,
    T: Clone + fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenizedCursor")
            .field("current", &self.current)
            .field("start", &self.start)
            .field("index", &self.index)
            .finish()
    }
}

impl<S, T> ParseState for TokenizedCursor<S, T>
where
    S: ParseState,
    T: Clone + fmt::Debug + 'static,
{
    type Token = T;
    type Position = LexPosition<S>;

    fn current(&self) -> Option<T> {
        self.current.clone()
    }

    fn advance(&self) -> Self {
        if self.current.is_none() {
            return self.clone();
        }
        Self::shift(self.lexer.clone(), self.rest.clone(), self.index + 1)
    }

    fn position(&self) -> LexPosition<S> {
        LexPosition(self.start.clone())
    }

    fn offset(&self) -> usize {
        self.index
    }

    fn dispose(&self) {
        self.rest.dispose()
    }

    fn pending_error(&self) -> Option<StreamError> {
        self.rest.pending_error()
    }
}
