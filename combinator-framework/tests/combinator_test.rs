use combinator_framework::text::{char_token, digit, spaces, string};
use combinator_framework::{
    any, between, choice, eoi, many, many1, optional, repeat, satisfy, sep_by, sep_by1,
    skip_many, token, ParseError, ParseResult, Parser,
};
use stream_framework::{IterCursor, ParseState, TextCursor, TokenCursor};

#[test]
fn test_map_preserves_resumed_state() {
    let plain = digit::<TextCursor>();
    let mapped = digit::<TextCursor>().map(|ch| ch as u8 - b'0');

    let plain_rest = plain.parse(TextCursor::new("7x")).into_state();
    match mapped.parse(TextCursor::new("7x")) {
        ParseResult::Success { value, rest } => {
            assert_eq!(value, 7);
            assert_eq!(rest.offset(), plain_rest.offset());
            assert_eq!(rest.position(), plain_rest.position());
        }
        ParseResult::Failure { error, .. } => panic!("unexpected failure: {error}"),
    }
}

#[test]
fn test_map_leaves_failures_untouched() {
    let parser = digit::<TextCursor>().map(|ch| ch.to_ascii_uppercase());
    match parser.parse(TextCursor::new("x")) {
        ParseResult::Failure { error, at } => {
            assert!(matches!(error, ParseError::Unexpected(_)));
            assert_eq!(at.offset(), 0);
        }
        ParseResult::Success { value, .. } => panic!("unexpected success: {value:?}"),
    }
}

#[test]
fn test_or_is_left_biased() {
    let parser = any::<TextCursor>().map(|_| "left").or(any().map(|_| "right"));
    assert_eq!(parser.parse(TextCursor::new("z")).value(), "left");
}

#[test]
fn test_many_on_no_match_is_empty() {
    let parser = many(digit::<TextCursor>());
    match parser.parse(TextCursor::new("abc")) {
        ParseResult::Success { value, rest } => {
            assert_eq!(value, Vec::<char>::new());
            assert_eq!(rest.offset(), 0);
        }
        ParseResult::Failure { error, .. } => panic!("unexpected failure: {error}"),
    }
}

#[test]
fn test_many_stops_before_failed_iteration() {
    let parser = many(digit::<TextCursor>());
    match parser.parse(TextCursor::new("123abc")) {
        ParseResult::Success { value, rest } => {
            assert_eq!(value, vec!['1', '2', '3']);
            assert_eq!(rest.offset(), 3);
            assert_eq!(rest.current(), Some('a'));
        }
        ParseResult::Failure { error, .. } => panic!("unexpected failure: {error}"),
    }
}

#[test]
fn test_many_keeps_one_zero_width_success() {
    let parser = many(Parser::<TextCursor, i32>::pure(1));
    match parser.parse(TextCursor::new("abc")) {
        ParseResult::Success { value, rest } => {
            assert_eq!(value, vec![1]);
            assert_eq!(rest.offset(), 0);
        }
        ParseResult::Failure { error, .. } => panic!("unexpected failure: {error}"),
    }
}

#[test]
fn test_many1_requires_one() {
    let parser = many1(digit::<TextCursor>());
    assert_eq!(parser.parse(TextCursor::new("42x")).value(), vec!['4', '2']);
    assert!(parser.parse(TextCursor::new("x")).is_failure());
}

#[test]
fn test_repeat_demands_exact_count() {
    let parser = repeat(digit::<TextCursor>(), 3);
    assert_eq!(parser.parse(TextCursor::new("1234")).value(), vec!['1', '2', '3']);
    assert!(parser.parse(TextCursor::new("12")).is_failure());

    let none = repeat(digit::<TextCursor>(), 0);
    assert_eq!(none.parse(TextCursor::new("xyz")).value(), Vec::<char>::new());
}

#[test]
fn test_sep_by_shapes() {
    let csv = sep_by(many1(digit::<TextCursor>()), char_token(','));
    assert_eq!(
        csv.parse(TextCursor::new("1,22,333")).value(),
        vec![vec!['1'], vec!['2', '2'], vec!['3', '3', '3']]
    );
    assert_eq!(csv.parse(TextCursor::new("")).value(), Vec::<Vec<char>>::new());

    let required = sep_by1(many1(digit::<TextCursor>()), char_token(','));
    assert!(required.parse(TextCursor::new("")).is_failure());
}

#[test]
fn test_sep_by_does_not_eat_trailing_separator() {
    let csv = sep_by(many1(digit::<TextCursor>()), char_token(','));
    match csv.parse(TextCursor::new("1,2,")) {
        ParseResult::Success { value, rest } => {
            assert_eq!(value.len(), 2);
            // The trailing comma stays for whoever parses next.
            assert_eq!(rest.current(), Some(','));
        }
        ParseResult::Failure { error, .. } => panic!("unexpected failure: {error}"),
    }
}

#[test]
fn test_between_keeps_inner_value() {
    let parser = between(char_token('['), many1(digit::<TextCursor>()), char_token(']'));
    assert_eq!(parser.parse(TextCursor::new("[42]")).value(), vec!['4', '2']);
    assert!(parser.parse(TextCursor::new("[42")).is_failure());
}

#[test]
fn test_choice_takes_first_success() {
    let parser = choice([
        string::<TextCursor>("red"),
        string("green"),
        string("blue"),
    ]);
    assert_eq!(parser.parse(TextCursor::new("green")).value(), "green");
    assert!(parser.parse(TextCursor::new("mauve")).is_failure());
}

#[test]
fn test_optional_never_fails() {
    let parser = optional(digit::<TextCursor>());
    assert_eq!(parser.parse(TextCursor::new("5")).value(), Some('5'));
    match parser.parse(TextCursor::new("x")) {
        ParseResult::Success { value, rest } => {
            assert_eq!(value, None);
            assert_eq!(rest.offset(), 0);
        }
        ParseResult::Failure { error, .. } => panic!("unexpected failure: {error}"),
    }
}

#[test]
fn test_skip_many_discards() {
    let parser = skip_many(spaces().then(digit::<TextCursor>()));
    match parser.parse(TextCursor::new(" 1 2 3!")) {
        ParseResult::Success { value: (), rest } => assert_eq!(rest.current(), Some('!')),
        ParseResult::Failure { error, .. } => panic!("unexpected failure: {error}"),
    }
}

#[test]
fn test_token_over_non_char_stream() {
    let state: TokenCursor<u32> = TokenCursor::new(vec![7, 8, 9]);
    let parser = token(7u32).then(satisfy(|n: &u32| *n % 2 == 0));
    assert_eq!(parser.parse(state).value(), 8);
}

#[test]
fn test_eoi_rejects_leftover_input() {
    let parser = digit::<TextCursor>().skip(eoi());
    assert!(parser.parse(TextCursor::new("5")).is_success());
    match parser.parse(TextCursor::new("55")) {
        ParseResult::Failure { error, at } => {
            assert!(error.to_string().contains("expected end of input"));
            assert_eq!(at.offset(), 1);
        }
        ParseResult::Success { value, .. } => panic!("unexpected success: {value:?}"),
    }
}

#[test]
fn test_forward_walk_over_iterator_stream() {
    // A one-pass iterator source works with purely forward grammars; a
    // failing leaf only inspects, so nothing is pulled past the stop.
    let state: IterCursor<std::ops::Range<i64>> = IterCursor::new(0..5);
    let parser = many(satisfy(|n: &i64| *n < 3));
    match parser.parse(state) {
        ParseResult::Success { value, rest } => {
            assert_eq!(value, vec![0, 1, 2]);
            assert_eq!(rest.current(), Some(3));
            assert_eq!(rest.offset(), 3);
        }
        ParseResult::Failure { error, .. } => panic!("unexpected failure: {error}"),
    }
}

#[test]
fn test_failure_convert_changes_value_type() {
    let failed: ParseResult<char, TextCursor> =
        digit::<TextCursor>().parse(TextCursor::new("x"));
    let converted = failed.convert::<Vec<String>>().expect("failures convert");
    match converted {
        ParseResult::Failure { error, at } => {
            assert!(matches!(error, ParseError::Unexpected(_)));
            assert_eq!(at.offset(), 0);
        }
        ParseResult::Success { .. } => panic!("conversion invented a success"),
    }

    let succeeded = digit::<TextCursor>().parse(TextCursor::new("1"));
    assert!(succeeded.convert::<Vec<String>>().is_none());
}

#[test]
fn test_case_destructures_both_arms() {
    let outcome = digit::<TextCursor>()
        .parse(TextCursor::new("3"))
        .case(|error, _| format!("failed: {error}"), |value, _| format!("ok: {value}"));
    assert_eq!(outcome, "ok: 3");
}
