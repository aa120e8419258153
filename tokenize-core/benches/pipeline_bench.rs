use criterion::{criterion_group, criterion_main, Criterion, Throughput};

use combinator_framework::text::{char_token, decimal, spaces};
use combinator_framework::{eoi, many, satisfy, token, Parser};
use stream_framework::TextCursor;
use tokenize_core::TokenizedCursor;

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Num(i64),
    Plus,
}

type Tokens = TokenizedCursor<TextCursor, Tok>;

fn lexer() -> Parser<TextCursor, Tok> {
    let number = decimal().map(Tok::Num);
    let plus = char_token('+').map(|_| Tok::Plus);
    spaces().then(number.or(plus))
}

fn sum_grammar() -> Parser<Tokens, i64> {
    let number = satisfy(|tok: &Tok| matches!(tok, Tok::Num(_))).map(|tok| match tok {
        Tok::Num(n) => n,
        Tok::Plus => 0,
    });
    let tail = many(token(Tok::Plus).then(number.clone()));
    number
        .and_then(move |first| {
            tail.clone()
                .map(move |rest| rest.into_iter().fold(first, |acc, n| acc + n))
        })
        .skip(eoi())
}

fn generate_sum(terms: usize) -> String {
    let mut out = String::with_capacity(terms * 4);
    for i in 0..terms {
        if i > 0 {
            out.push_str(" + ");
        }
        out.push_str("12");
    }
    out
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize_pipeline");

    let terms = 5_000usize;
    let input = generate_sum(terms);
    group.throughput(Throughput::Elements(terms as u64));
    group.bench_function("lex_and_sum", |b| {
        let grammar = sum_grammar();
        b.iter(|| {
            let tokens = TokenizedCursor::new(lexer(), TextCursor::new(input.clone()));
            let result = grammar.parse(tokens);
            assert!(result.is_success());
        })
    });

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
