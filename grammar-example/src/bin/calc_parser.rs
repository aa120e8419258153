//! Calculator example
//!
//! The two-phase pipeline over one engine: a lexing parser turns text into
//! tokens, `TokenizedCursor` exposes them as an ordinary stream state, and
//! a token-level grammar evaluates arithmetic with precedence.

use combinator_framework::text::{char_token, decimal, spaces};
use combinator_framework::{between, choice, eoi, many, satisfy, token, ParseResult, Parser};
use stream_framework::TextCursor;
use tokenize_core::TokenizedCursor;

#[derive(Debug, Clone, PartialEq)]
enum CalcToken {
    Number(i64),
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
}

type Tokens = TokenizedCursor<TextCursor, CalcToken>;

fn lexer() -> Parser<TextCursor, CalcToken> {
    let number = decimal().map(CalcToken::Number);
    let punct = choice([
        char_token('+').map(|_| CalcToken::Plus),
        char_token('-').map(|_| CalcToken::Minus),
        char_token('*').map(|_| CalcToken::Star),
        char_token('/').map(|_| CalcToken::Slash),
        char_token('(').map(|_| CalcToken::LeftParen),
        char_token(')').map(|_| CalcToken::RightParen),
    ]);
    spaces().then(number.or(punct))
}

fn apply(op: CalcToken, lhs: i64, rhs: i64) -> i64 {
    match op {
        CalcToken::Plus => lhs + rhs,
        CalcToken::Minus => lhs - rhs,
        CalcToken::Star => lhs * rhs,
        // Division by zero folds to zero in this toy evaluator.
        CalcToken::Slash => {
            if rhs == 0 {
                0
            } else {
                lhs / rhs
            }
        }
        _ => lhs,
    }
}

/// Left-associative chain: `operand (operator operand)*`.
fn chain(
    operand: Parser<Tokens, i64>,
    operator: Parser<Tokens, CalcToken>,
) -> Parser<Tokens, i64> {
    let tail = many(operator.and_then({
        let operand = operand.clone();
        move |op| {
            operand
                .clone()
                .map(move |rhs| (op.clone(), rhs))
        }
    }));
    operand.and_then(move |first| {
        tail.clone().map(move |steps| {
            steps
                .into_iter()
                .fold(first, |lhs, (op, rhs)| apply(op, lhs, rhs))
        })
    })
}

fn number_value() -> Parser<Tokens, i64> {
    satisfy(|tok| matches!(tok, CalcToken::Number(_))).map(|tok| match tok {
        CalcToken::Number(n) => n,
        _ => 0,
    })
}

fn expr() -> Parser<Tokens, i64> {
    Parser::fix(|expr| {
        let factor = number_value().or(between(
            token(CalcToken::LeftParen),
            expr.clone(),
            token(CalcToken::RightParen),
        ));
        let term = chain(
            factor,
            satisfy(|tok| matches!(tok, CalcToken::Star | CalcToken::Slash)),
        );
        chain(
            term,
            satisfy(|tok| matches!(tok, CalcToken::Plus | CalcToken::Minus)),
        )
    })
}

fn main() {
    tracing_subscriber::fmt::init();

    let grammar = expr().skip(eoi());
    for input in ["1 + 2 * 3", "(1 + 2) * 3", "10 - 4 / 2", "2 * (3 + 4) - 5"] {
        let tokens = TokenizedCursor::new(lexer(), TextCursor::new(input));
        match grammar.parse(tokens) {
            ParseResult::Success { value, .. } => println!("{input} = {value}"),
            failure => eprintln!("{input}: {failure}"),
        }
    }
}
