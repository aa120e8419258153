use std::sync::Arc;

use stream_framework::ParseState;

use crate::engine::{Execute, Frame, Outcome, Transition};
use crate::parser::Parser;
use crate::result::{ParseError, ParseResult};

/// The restricted shape for leaf parsers: inspect the state, advance past
/// whatever was matched, and return a result directly.
///
/// Leaves never invoke another parser, so they need no continuation —
/// [`from_primitive`] adapts them to the engine's general shape by feeding
/// the direct result to the machine. All higher combinators bottom out in
/// leaves of this shape.
pub trait PrimitiveParse<S: ParseState> {
    type Output: 'static;

    fn parse_primitive(&self, state: S) -> ParseResult<Self::Output, S>;
}

/// Lifts a primitive leaf into a full parser.
pub fn from_primitive<S, P>(primitive: P) -> Parser<S, P::Output>
where
    S: ParseState,
    P: PrimitiveParse<S> + Send + Sync + 'static,
{
    Parser::from_node(Arc::new(Leaf { primitive }))
}

struct Leaf<P> {
    primitive: P,
}

impl<S, P> Execute<S> for Leaf<P>
where
    S: ParseState,
    P: PrimitiveParse<S> + Send + Sync,
{
    fn execute(&self, state: S, _stack: &mut Vec<Frame<S>>) -> Transition<S> {
        Transition::Yield(match self.primitive.parse_primitive(state) {
            ParseResult::Success { value, rest } => Outcome::Ok(Box::new(value), rest),
            ParseResult::Failure { error, at } => Outcome::Err(error, at),
        })
    }
}

/// Any single token.
pub fn any<S: ParseState>() -> Parser<S, S::Token> {
    from_primitive(AnyToken)
}

struct AnyToken;

impl<S: ParseState> PrimitiveParse<S> for AnyToken {
    type Output = S::Token;

    fn parse_primitive(&self, state: S) -> ParseResult<S::Token, S> {
        match state.current() {
            Some(token) => {
                let rest = state.advance();
                ParseResult::Success { value: token, rest }
            }
            None => ParseResult::Failure {
                error: ParseError::UnexpectedEndOfInput,
                at: state,
            },
        }
    }
}

/// A single token satisfying `predicate`.
pub fn satisfy<S: ParseState>(
    predicate: impl Fn(&S::Token) -> bool + Send + Sync + 'static,
) -> Parser<S, S::Token> {
    from_primitive(Satisfy { predicate })
}

struct Satisfy<F> {
    predicate: F,
}

impl<S, F> PrimitiveParse<S> for Satisfy<F>
where
    S: ParseState,
    F: Fn(&S::Token) -> bool,
{
    type Output = S::Token;

    fn parse_primitive(&self, state: S) -> ParseResult<S::Token, S> {
        match state.current() {
            Some(token) if (self.predicate)(&token) => {
                let rest = state.advance();
                ParseResult::Success { value: token, rest }
            }
            Some(token) => ParseResult::Failure {
                error: ParseError::Unexpected(format!("{token:?}")),
                at: state,
            },
            None => ParseResult::Failure {
                error: ParseError::UnexpectedEndOfInput,
                at: state,
            },
        }
    }
}

/// Exactly the token `expected`.
pub fn token<S>(expected: S::Token) -> Parser<S, S::Token>
where
    S: ParseState,
    S::Token: PartialEq + Send + Sync,
{
    from_primitive(ExpectToken { expected })
}

struct ExpectToken<T> {
    expected: T,
}

impl<S> PrimitiveParse<S> for ExpectToken<S::Token>
where
    S: ParseState,
    S::Token: PartialEq,
{
    type Output = S::Token;

    fn parse_primitive(&self, state: S) -> ParseResult<S::Token, S> {
        match state.current() {
            Some(token) if token == self.expected => {
                let rest = state.advance();
                ParseResult::Success { value: token, rest }
            }
            Some(token) => ParseResult::Failure {
                error: ParseError::Unexpected(format!(
                    "{token:?}, expected {:?}",
                    self.expected
                )),
                at: state,
            },
            None => ParseResult::Failure {
                error: ParseError::UnexpectedEndOfInput,
                at: state,
            },
        }
    }
}

/// Succeeds with `()` only at end of input.
pub fn eoi<S: ParseState>() -> Parser<S, ()> {
    from_primitive(EndOfInput)
}

struct EndOfInput;

impl<S: ParseState> PrimitiveParse<S> for EndOfInput {
    type Output = ();

    fn parse_primitive(&self, state: S) -> ParseResult<(), S> {
        match state.current() {
            None => ParseResult::Success {
                value: (),
                rest: state,
            },
            Some(token) => ParseResult::Failure {
                error: ParseError::Unexpected(format!("{token:?}, expected end of input")),
                at: state,
            },
        }
    }
}
