use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::position::{Offset, TokenPosition};
use crate::state::ParseState;

/// A state over a one-pass external iterator.
///
/// All states derived from one root share the iterator, and advancing a
/// state pulls it. Advancing is therefore only valid in forward order:
/// advancing the same state twice pulls two different tokens. This is a
/// deliberate relaxation of the persistence invariant the other states
/// honor — do not use this source with backtracking combinators. Prefer
/// [`TokenCursor`](crate::cursor::TokenCursor) (collect first) or
/// [`ChunkedCursor`](crate::chunked::ChunkedCursor) when alternation or
/// lookahead is involved.
pub struct IterCursor<I: Iterator, P = Offset> {
    iter: Rc<RefCell<I>>,
    current: Option<I::Item>,
    offset: usize,
    position: P,
}

impl<I, P> IterCursor<I, P>
where
    I: Iterator + 'static,
    I::Item: Clone + fmt::Debug + 'static,
    P: TokenPosition<I::Item>,
{
    /// Creates a state at the first element of `source`.
    pub fn new(source: impl IntoIterator<IntoIter = I>) -> Self {
        let mut iter = source.into_iter();
        let current = iter.next();
        Self {
            iter: Rc::new(RefCell::new(iter)),
            current,
            offset: 0,
            position: P::initial(),
        }
    }
}

impl<I: Iterator, P: Clone> Clone for IterCursor<I, P>
where
    I::Item: Clone,
{
    fn clone(&self) -> Self {
        Self {
            iter: Rc::clone(&self.iter),
            current: self.current.clone(),
            offset: self.offset,
            position: self.position.clone(),
        }
    }
}

impl<I: Iterator, P: fmt::Debug> fmt::Debug for IterCursor<I, P>
where
    I::Item: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterCursor")
            .field("current", &self.current)
            .field("offset", &self.offset)
            .field("position", &self.position)
            .finish()
    }
}

impl<I, P> ParseState for IterCursor<I, P>
where
    I: Iterator + 'static,
    I::Item: Clone + fmt::Debug + 'static,
    P: TokenPosition<I::Item>,
{
    type Token = I::Item;
    type Position = P;

    fn current(&self) -> Option<I::Item> {
        self.current.clone()
    }

    fn advance(&self) -> Self {
        match &self.current {
            Some(token) => Self {
                iter: Rc::clone(&self.iter),
                current: self.iter.borrow_mut().next(),
                offset: self.offset + 1,
                position: self.position.advance(token),
            },
            None => self.clone(),
        }
    }

    fn position(&self) -> P {
        self.position.clone()
    }

    fn offset(&self) -> usize {
        self.offset
    }
}
