use std::marker::PhantomData;
use std::sync::Arc;

use stream_framework::ParseState;

use crate::engine::{collect_frame, ExecRef, Execute, Frame, Outcome, Transition};
use crate::parser::Parser;

/// Zero or more repetitions of `parser`.
///
/// Stops at the first failing repetition, resuming from just before it. An
/// iteration that succeeds without consuming ends the loop after its value
/// is kept once — repeating it could never terminate.
pub fn many<S: ParseState, T: 'static>(parser: Parser<S, T>) -> Parser<S, Vec<T>> {
    Parser::from_node(Arc::new(ManyNode {
        item: parser.node,
        _marker: PhantomData::<fn() -> T>,
    }))
}

/// One or more repetitions of `parser`.
pub fn many1<S, T>(parser: Parser<S, T>) -> Parser<S, Vec<T>>
where
    S: ParseState,
    T: Clone + Send + Sync + 'static,
{
    let tail = many(parser.clone());
    parser.and_then(move |head| {
        tail.clone().map(move |rest| {
            let mut all = Vec::with_capacity(rest.len() + 1);
            all.push(head.clone());
            all.extend(rest);
            all
        })
    })
}

/// Exactly `count` repetitions of `parser`; any failure propagates.
pub fn repeat<S: ParseState, T: 'static>(parser: Parser<S, T>, count: usize) -> Parser<S, Vec<T>> {
    Parser::from_node(Arc::new(RepeatNode {
        item: parser.node,
        count,
        _marker: PhantomData::<fn() -> T>,
    }))
}

/// Zero or more `item`s separated by `separator`.
pub fn sep_by<S, T, Sep>(item: Parser<S, T>, separator: Parser<S, Sep>) -> Parser<S, Vec<T>>
where
    S: ParseState,
    T: Clone + Send + Sync + 'static,
    Sep: 'static,
{
    sep_by1(item, separator).or(Parser::pure(Vec::new()))
}

/// One or more `item`s separated by `separator`.
pub fn sep_by1<S, T, Sep>(item: Parser<S, T>, separator: Parser<S, Sep>) -> Parser<S, Vec<T>>
where
    S: ParseState,
    T: Clone + Send + Sync + 'static,
    Sep: 'static,
{
    let tail = many(separator.then(item.clone()));
    item.and_then(move |head| {
        tail.clone().map(move |rest| {
            let mut all = Vec::with_capacity(rest.len() + 1);
            all.push(head.clone());
            all.extend(rest);
            all
        })
    })
}

/// `inner` delimited by `open` and `close`, keeping only `inner`'s value.
pub fn between<S, O, T, C>(
    open: Parser<S, O>,
    inner: Parser<S, T>,
    close: Parser<S, C>,
) -> Parser<S, T>
where
    S: ParseState,
    O: 'static,
    T: Clone + Send + Sync + 'static,
    C: 'static,
{
    open.then(inner.skip(close))
}

/// The first succeeding parser, tried left to right.
pub fn choice<S, T>(parsers: impl IntoIterator<Item = Parser<S, T>>) -> Parser<S, T>
where
    S: ParseState,
    T: 'static,
{
    let mut parsers = parsers.into_iter();
    let first = match parsers.next() {
        Some(parser) => parser,
        None => Parser::fail("empty choice"),
    };
    parsers.fold(first, |chosen, next| chosen.or(next))
}

/// `parser`, or `None` without consuming anything if it fails.
pub fn optional<S, T>(parser: Parser<S, T>) -> Parser<S, Option<T>>
where
    S: ParseState,
    T: Clone + Send + Sync + 'static,
{
    parser.map(Some).or(Parser::pure(None))
}

/// Zero or more repetitions, discarding the values.
pub fn skip_many<S, T>(parser: Parser<S, T>) -> Parser<S, ()>
where
    S: ParseState,
    T: 'static,
{
    many(parser).map(|_| ())
}

struct ManyNode<S: ParseState, T> {
    item: ExecRef<S>,
    _marker: PhantomData<fn() -> T>,
}

impl<S: ParseState, T: 'static> Execute<S> for ManyNode<S, T> {
    fn execute(&self, state: S, stack: &mut Vec<Frame<S>>) -> Transition<S> {
        stack.push(collect_frame::<S, T>());
        stack.push(Frame::Many {
            item: Arc::clone(&self.item),
            acc: Vec::new(),
            committed: state.clone(),
        });
        Transition::Call(Arc::clone(&self.item), state)
    }
}

struct RepeatNode<S: ParseState, T> {
    item: ExecRef<S>,
    count: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<S: ParseState, T: 'static> Execute<S> for RepeatNode<S, T> {
    fn execute(&self, state: S, stack: &mut Vec<Frame<S>>) -> Transition<S> {
        if self.count == 0 {
            return Transition::Yield(Outcome::Ok(Box::new(Vec::<T>::new()), state));
        }
        stack.push(collect_frame::<S, T>());
        stack.push(Frame::Repeat {
            item: Arc::clone(&self.item),
            acc: Vec::new(),
            remaining: self.count,
        });
        Transition::Call(Arc::clone(&self.item), state)
    }
}
