//! Character-level helpers for states whose tokens are `char`.

use stream_framework::ParseState;

use crate::combinator::{many1, skip_many};
use crate::parser::Parser;
use crate::primitive::{from_primitive, satisfy, token, PrimitiveParse};
use crate::result::{ParseError, ParseResult};

/// Exactly the character `expected`.
pub fn char_token<S>(expected: char) -> Parser<S, char>
where
    S: ParseState<Token = char>,
{
    token(expected)
}

/// Any character contained in `set`.
pub fn one_of<S>(set: &'static str) -> Parser<S, char>
where
    S: ParseState<Token = char>,
{
    satisfy(move |ch| set.contains(*ch))
}

/// Any character not contained in `set`.
pub fn none_of<S>(set: &'static str) -> Parser<S, char>
where
    S: ParseState<Token = char>,
{
    satisfy(move |ch| !set.contains(*ch))
}

/// An ASCII digit.
pub fn digit<S>() -> Parser<S, char>
where
    S: ParseState<Token = char>,
{
    satisfy(|ch: &char| ch.is_ascii_digit())
}

/// An alphabetic character.
pub fn letter<S>() -> Parser<S, char>
where
    S: ParseState<Token = char>,
{
    satisfy(|ch: &char| ch.is_alphabetic())
}

/// A single whitespace character.
pub fn whitespace<S>() -> Parser<S, char>
where
    S: ParseState<Token = char>,
{
    satisfy(|ch: &char| ch.is_whitespace())
}

/// Zero or more whitespace characters, discarded.
pub fn spaces<S>() -> Parser<S, ()>
where
    S: ParseState<Token = char>,
{
    skip_many(whitespace())
}

/// The exact sequence of characters in `expected`.
pub fn string<S>(expected: &'static str) -> Parser<S, String>
where
    S: ParseState<Token = char>,
{
    from_primitive(ExpectString { expected })
}

struct ExpectString {
    expected: &'static str,
}

impl<S> PrimitiveParse<S> for ExpectString
where
    S: ParseState<Token = char>,
{
    type Output = String;

    fn parse_primitive(&self, state: S) -> ParseResult<String, S> {
        let mut cursor = state;
        for expected in self.expected.chars() {
            match cursor.current() {
                Some(ch) if ch == expected => cursor = cursor.advance(),
                Some(ch) => {
                    return ParseResult::Failure {
                        error: ParseError::Unexpected(format!(
                            "{ch:?}, expected {expected:?} of {:?}",
                            self.expected
                        )),
                        at: cursor,
                    }
                }
                None => {
                    return ParseResult::Failure {
                        error: ParseError::UnexpectedEndOfInput,
                        at: cursor,
                    }
                }
            }
        }
        ParseResult::Success {
            value: self.expected.to_string(),
            rest: cursor,
        }
    }
}

/// An unsigned decimal integer.
///
/// Overflow surfaces as an exception failure with the digits consumed.
pub fn decimal<S>() -> Parser<S, i64>
where
    S: ParseState<Token = char>,
{
    many1(digit()).try_map(|digits| digits.into_iter().collect::<String>().parse::<i64>())
}
