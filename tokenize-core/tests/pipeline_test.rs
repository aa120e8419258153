use combinator_framework::text::{char_token, decimal, spaces};
use combinator_framework::{eoi, many, satisfy, token, ParseState, Parser};
use stream_framework::{LineColumn, TextCursor};
use tokenize_core::TokenizedCursor;

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Num(i64),
    Plus,
}

fn lexer() -> Parser<TextCursor, Tok> {
    let number = decimal().map(Tok::Num);
    let plus = char_token('+').map(|_| Tok::Plus);
    spaces().then(number.or(plus))
}

fn tokens(input: &str) -> TokenizedCursor<TextCursor, Tok> {
    TokenizedCursor::new(lexer(), TextCursor::new(input))
}

fn number() -> Parser<TokenizedCursor<TextCursor, Tok>, i64> {
    satisfy(|tok: &Tok| matches!(tok, Tok::Num(_))).map(|tok| match tok {
        Tok::Num(n) => n,
        Tok::Plus => 0,
    })
}

#[test]
fn test_tokenized_stream_walk() {
    let state = tokens("1 + 23");
    assert_eq!(state.current(), Some(Tok::Num(1)));
    assert_eq!(state.offset(), 0);

    let state = state.advance();
    assert_eq!(state.current(), Some(Tok::Plus));
    assert_eq!(state.offset(), 1);

    let state = state.advance();
    assert_eq!(state.current(), Some(Tok::Num(23)));

    let state = state.advance();
    assert!(state.is_eof());
}

#[test]
fn test_token_positions_point_into_the_text() {
    let state = tokens("1 + 23");
    assert_eq!(state.position().0, LineColumn::at(1, 1));
    let state = state.advance();
    // Each token carries the text position its lexing step started from,
    // layout included: the step that produced '+' began at column 2.
    assert_eq!(state.position().0, LineColumn::at(1, 2));
    let state = state.advance();
    assert_eq!(state.position().0, LineColumn::at(1, 4));
}

#[test]
fn test_sum_grammar_over_tokens() {
    let sum = {
        let tail = many(token(Tok::Plus).then(number()));
        number().and_then(move |first| {
            tail.clone()
                .map(move |rest| rest.into_iter().fold(first, |acc, n| acc + n))
        })
    };
    let grammar = sum.skip(eoi());
    assert_eq!(grammar.parse(tokens("1 + 23 + 4")).value(), 28);
    assert!(grammar.parse(tokens("1 + + 2")).is_failure());
}

#[test]
fn test_tokenized_stream_backtracks() {
    // Alternation re-derives tokenized states just like any other stream.
    let pair = token(Tok::Num(1)).then(token(Tok::Plus));
    let parser = pair
        .then(token(Tok::Num(99)))
        .or(token(Tok::Num(1)).then(token(Tok::Plus)).then(token(Tok::Num(23))));
    assert_eq!(parser.parse(tokens("1 + 23")).value(), Tok::Num(23));
}

#[test]
fn test_lexer_failure_ends_token_stream() {
    // '?' is no token; the stream simply ends before it.
    let state = tokens("7 ?");
    assert_eq!(state.current(), Some(Tok::Num(7)));
    let state = state.advance();
    assert!(state.is_eof());

    // The token-level grammar sees plain end of input.
    let grammar = number().skip(eoi());
    assert!(grammar.parse(tokens("7 ?")).is_success());
}
