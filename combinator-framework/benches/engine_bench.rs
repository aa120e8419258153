use criterion::{criterion_group, criterion_main, Criterion, Throughput};

use combinator_framework::text::{char_token, decimal, spaces};
use combinator_framework::{any, many, sep_by, Parser};
use stream_framework::{TextCursor, TokenCursor};

// --- Data Generation ---
fn generate_numbers(count: usize) -> String {
    let mut out = String::with_capacity(count * 5);
    for i in 0..count {
        if i > 0 {
            out.push(',');
        }
        out.push_str(" 123 ");
    }
    out
}

fn generate_nested(depth: usize) -> String {
    "[".repeat(depth) + &"]".repeat(depth)
}

fn bench_repetition(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_repetition");

    let size = 100_000usize;
    let text = "x".repeat(size);
    group.throughput(Throughput::Elements(size as u64));
    group.bench_function("many_any_chars", |b| {
        let parser = many(any::<TextCursor>());
        b.iter(|| {
            let result = parser.parse(TextCursor::new(text.clone()));
            assert!(result.is_success());
        })
    });

    let tokens: Vec<u8> = vec![7; size];
    group.bench_function("many_any_tokens", |b| {
        let parser = many(any::<TokenCursor<u8>>());
        b.iter(|| {
            let result = parser.parse(TokenCursor::new(tokens.clone()));
            assert!(result.is_success());
        })
    });

    group.finish();
}

fn bench_grammar(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_grammar");

    let count = 10_000usize;
    let numbers = generate_numbers(count);
    group.throughput(Throughput::Elements(count as u64));
    group.bench_function("sep_by_decimals", |b| {
        let item = spaces().then(decimal::<TextCursor>()).skip(spaces());
        let parser = sep_by(item, char_token(','));
        b.iter(|| {
            let result = parser.parse(TextCursor::new(numbers.clone()));
            assert!(result.is_success());
        })
    });

    // Deep dynamic recursion through the fix-point: the trampoline keeps
    // the native stack flat however deep this goes.
    let depth = 10_000usize;
    let nested = generate_nested(depth);
    group.bench_function("fix_point_nesting", |b| {
        let parser = Parser::fix(|rec| {
            char_token::<TextCursor>('[')
                .then(rec)
                .skip(char_token(']'))
                .map(|n: usize| n + 1)
                .or(Parser::pure(0))
        });
        b.iter(|| {
            let result = parser.parse(TextCursor::new(nested.clone()));
            assert!(result.is_success());
        })
    });

    group.finish();
}

criterion_group!(benches, bench_repetition, bench_grammar);
criterion_main!(benches);
