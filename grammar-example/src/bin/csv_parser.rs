//! CSV parser example
//!
//! Parses the header record with `parse_partially`, then hands the live
//! remainder to the body grammar — two independent parses sharing one
//! input and one buffering lifetime.

use std::env;
use std::fs::File;
use std::process;

use combinator_framework::text::{char_token, none_of};
use combinator_framework::{many, sep_by, sep_by1, ParseResult, Parser};
use stream_framework::{CharCursor, ParseState, TextCursor};

fn field<S: ParseState<Token = char>>() -> Parser<S, String> {
    many(none_of(",\n")).map(|chars| chars.into_iter().collect())
}

fn record<S: ParseState<Token = char>>() -> Parser<S, Vec<String>> {
    sep_by1(field(), char_token(','))
}

fn header<S: ParseState<Token = char>>() -> Parser<S, Vec<String>> {
    record().skip(char_token('\n'))
}

fn body<S: ParseState<Token = char>>() -> Parser<S, Vec<Vec<String>>> {
    sep_by(record(), char_token('\n'))
}

fn run<S: ParseState<Token = char>>(state: S) {
    let (columns, rest) = header().parse_partially(state).into_parts();
    let columns = match columns {
        ParseResult::Success { value, .. } => value,
        failure => {
            eprintln!("bad header: {failure}");
            rest.dispose();
            process::exit(1);
        }
    };
    println!("columns: {columns:?}");

    let (rows, rest) = rest.continue_with(&body()).into_parts();
    match rows {
        ParseResult::Success { value, .. } => {
            for row in &value {
                if row.len() != columns.len() {
                    eprintln!("ragged row: {row:?}");
                }
            }
            println!("{} rows", value.len());
        }
        failure => eprintln!("bad body: {failure}"),
    }
    rest.dispose();
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
            run(CharCursor::from_reader(file));
        }
        None => {
            let sample = "name,language,year\nAda,Ada,1980\nGrace,COBOL,1959\nBarbara,CLU,1974";
            run(TextCursor::new(sample));
        }
    }
}
