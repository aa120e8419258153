use std::sync::Arc;

use crate::position::{LineColumn, Offset, TokenPosition};
use crate::state::ParseState;

/// An indexed state over a shared token buffer.
///
/// Advancing is an O(1) index increment. The buffer is immutable and
/// reference-counted, so any number of states derived from the same input
/// coexist and may be consumed from different threads.
#[derive(Debug, Clone)]
pub struct TokenCursor<T, P = Offset> {
    tokens: Arc<[T]>,
    index: usize,
    position: P,
}

impl<T, P> TokenCursor<T, P>
where
    T: Clone + std::fmt::Debug + 'static,
    P: TokenPosition<T>,
{
    /// Creates a state at the start of `tokens`.
    pub fn new(tokens: impl Into<Arc<[T]>>) -> Self {
        Self {
            tokens: tokens.into(),
            index: 0,
            position: P::initial(),
        }
    }

    /// Returns the not-yet-consumed tail of the buffer.
    pub fn remaining(&self) -> &[T] {
        &self.tokens[self.index.min(self.tokens.len())..]
    }
}

impl<T, P> ParseState for TokenCursor<T, P>
where
    T: Clone + std::fmt::Debug + 'static,
    P: TokenPosition<T>,
{
    type Token = T;
    type Position = P;

    fn current(&self) -> Option<T> {
        self.tokens.get(self.index).cloned()
    }

    fn advance(&self) -> Self {
        match self.tokens.get(self.index) {
            Some(token) => Self {
                tokens: Arc::clone(&self.tokens),
                index: self.index + 1,
                position: self.position.advance(token),
            },
            None => self.clone(),
        }
    }

    fn position(&self) -> P {
        self.position.clone()
    }

    fn offset(&self) -> usize {
        self.index
    }
}

/// A text state over a shared string buffer, yielding `char` tokens with
/// line/column positions.
#[derive(Debug, Clone)]
pub struct TextCursor {
    text: Arc<str>,
    byte: usize,
    chars: usize,
    position: LineColumn,
}

impl TextCursor {
    /// Creates a state at the start of `text`.
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self {
            text: text.into(),
            byte: 0,
            chars: 0,
            position: TokenPosition::<char>::initial(),
        }
    }

    /// Returns the not-yet-consumed remainder of the input.
    pub fn remaining(&self) -> &str {
        &self.text[self.byte..]
    }
}

impl ParseState for TextCursor {
    type Token = char;
    type Position = LineColumn;

    fn current(&self) -> Option<char> {
        self.text[self.byte..].chars().next()
    }

    fn advance(&self) -> Self {
        match self.current() {
            Some(ch) => Self {
                text: Arc::clone(&self.text),
                byte: self.byte + ch.len_utf8(),
                chars: self.chars + 1,
                position: self.position.advance(&ch),
            },
            None => self.clone(),
        }
    }

    fn position(&self) -> LineColumn {
        self.position
    }

    fn offset(&self) -> usize {
        self.chars
    }
}
