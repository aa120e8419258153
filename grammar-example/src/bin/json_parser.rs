//! JSON parser example
//!
//! A complete JSON value grammar built from the combinator framework:
//! recursive structure via the fix-point, and the same grammar running over
//! an in-memory text cursor or a chunked file reader.

use std::env;
use std::fs::File;
use std::process;

use combinator_framework::text::{char_token, none_of, one_of, spaces, string};
use combinator_framework::{any, between, choice, eoi, many, many1, sep_by, ParseResult, Parser};
use stream_framework::{CharCursor, ParseState, TextCursor};

#[derive(Debug, Clone)]
enum Json {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Array(Vec<Json>),
    Object(Vec<(String, Json)>),
}

/// A string literal with the common escapes.
fn json_text<S: ParseState<Token = char>>() -> Parser<S, String> {
    let escape = char_token('\\').then(any()).and_then(|ch| match ch {
        '"' => Parser::pure('"'),
        '\\' => Parser::pure('\\'),
        '/' => Parser::pure('/'),
        'n' => Parser::pure('\n'),
        't' => Parser::pure('\t'),
        'r' => Parser::pure('\r'),
        other => Parser::fail(format!("unsupported escape \\{other}")),
    });
    between(
        char_token('"'),
        many(none_of("\"\\").or(escape)),
        char_token('"'),
    )
    .map(|chars| chars.into_iter().collect())
}

fn json_number<S: ParseState<Token = char>>() -> Parser<S, Json> {
    many1(one_of("+-.eE0123456789"))
        .try_map(|chars| chars.into_iter().collect::<String>().parse::<f64>())
        .map(Json::Number)
}

fn json_value<S: ParseState<Token = char>>() -> Parser<S, Json> {
    Parser::fix(|value| {
        let padded = |parser: Parser<S, Json>| spaces().then(parser).skip(spaces());

        let array = between(
            char_token('[').then(spaces()),
            sep_by(padded(value.clone()), char_token(',')),
            char_token(']'),
        )
        .map(Json::Array);

        let member = {
            let value = value.clone();
            json_text().and_then(move |key| {
                spaces()
                    .then(char_token(':'))
                    .then(spaces())
                    .then(value.clone())
                    .skip(spaces())
                    .map(move |item| (key.clone(), item))
            })
        };
        let object = between(
            char_token('{').then(spaces()),
            sep_by(spaces().then(member), char_token(',')),
            char_token('}'),
        )
        .map(Json::Object);

        choice([
            string("null").map(|_| Json::Null),
            string("true").map(|_| Json::Bool(true)),
            string("false").map(|_| Json::Bool(false)),
            json_text().map(Json::Text),
            json_number(),
            array,
            object,
        ])
    })
}

fn json_document<S: ParseState<Token = char>>() -> Parser<S, Json> {
    spaces().then(json_value()).skip(spaces()).skip(eoi())
}

fn report<S: ParseState<Token = char>>(result: ParseResult<Json, S>) {
    match result {
        ParseResult::Success { value, .. } => println!("{value:#?}"),
        failure => {
            eprintln!("{failure}");
            process::exit(1);
        }
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    match env::args().nth(1) {
        Some(path) => {
            let file = match File::open(&path) {
                Ok(file) => file,
                Err(error) => {
                    eprintln!("cannot open {path}: {error}");
                    process::exit(1);
                }
            };
            report(json_document().parse(CharCursor::from_reader(file)));
        }
        None => {
            let sample = r#"{
                "name": "Alice",
                "age": 30,
                "active": true,
                "tags": ["developer", "rust"],
                "address": null,
                "scores": [1.5, -2, 3e2]
            }"#;
            report(json_document().parse(TextCursor::new(sample)));
        }
    }
}
