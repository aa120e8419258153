//! Combinator Framework
//!
//! A parser-combinator engine over the stream states of `stream-framework`.
//! Parsers compose into larger parsers without an intermediate grammar
//! representation, and the engine interprets them on an explicit
//! continuation stack, so grammar recursion and input length never grow the
//! native call stack.
//!
//! Failures are values the whole way through: structured call-sites `match`
//! on [`ParseResult`], and only the documented [`ParseResult::value`]
//! accessor turns a failure into a panic.

pub mod combinator;
mod engine;
pub mod parser;
pub mod primitive;
pub mod result;
pub mod suspend;
pub mod text;

pub use combinator::{
    between, choice, many, many1, optional, repeat, sep_by, sep_by1, skip_many,
};
pub use parser::{fix_fn, Parser, RecFn};
pub use primitive::{any, eoi, from_primitive, satisfy, token, PrimitiveParse};
pub use result::{ParseError, ParseResult};
pub use suspend::{PartialResult, Tail};

pub use stream_framework::{ParseState, StreamError, TokenPosition};
