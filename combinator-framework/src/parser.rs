use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use once_cell::race::OnceBox;
use stream_framework::ParseState;

use crate::engine::{run_loop, retype, AnyVal, ExecRef, Execute, Frame, Outcome, Transition};
use crate::result::{ParseError, ParseResult};
use crate::suspend::PartialResult;

/// A composable parser over states of type `S`, producing values of type
/// `T`.
///
/// Parsers are cheap shared handles: cloning copies an `Arc`. One parser
/// value can be run any number of times, over independent states, from any
/// thread — runs share nothing but the immutable parser graph.
pub struct Parser<S: ParseState, T> {
    pub(crate) node: ExecRef<S>,
    _marker: PhantomData<fn() -> T>,
}

impl<S: ParseState, T> Clone for Parser<S, T> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
            _marker: PhantomData,
        }
    }
}

impl<S: ParseState, T> fmt::Debug for Parser<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser").finish_non_exhaustive()
    }
}

impl<S: ParseState, T: 'static> Parser<S, T> {
    pub(crate) fn from_node(node: ExecRef<S>) -> Self {
        Self {
            node,
            _marker: PhantomData,
        }
    }

    /// A parser that consumes nothing and succeeds with `value`.
    pub fn pure(value: T) -> Self
    where
        T: Clone + Send + Sync,
    {
        Self::from_node(Arc::new(Pure { value }))
    }

    /// A parser that fails unconditionally with a declared expectation.
    pub fn fail(message: impl Into<String>) -> Self {
        Self::from_node(Arc::new(Fail {
            error: ParseError::Message(message.into()),
        }))
    }

    /// A parser that fails unconditionally, wrapping `error` as the cause.
    pub fn fail_with(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::from_node(Arc::new(Fail {
            error: ParseError::exception(error),
        }))
    }

    /// Defers construction of a parser until first use.
    ///
    /// The builder's product is memoized through a publish-once cell: when
    /// several threads race on first use, one build is published and the
    /// losers' products are discarded. No lock is held while building, so a
    /// builder that reaches the same cell again cannot deadlock.
    pub fn lazy(build: impl Fn() -> Self + Send + Sync + 'static) -> Self {
        Self::from_node(Arc::new(Lazy {
            cell: OnceBox::new(),
            build: Arc::new(build),
        }))
    }

    /// Ties the knot for a self-referential grammar: `build` receives a
    /// handle to the parser being defined and returns its body.
    ///
    /// The handle defers through a publish-once cell, so the definition can
    /// mention itself without recursing at construction time.
    pub fn fix(build: impl FnOnce(Self) -> Self) -> Self {
        let cell = Arc::new(OnceBox::new());
        let handle = Self::from_node(Arc::new(Knot {
            cell: Arc::clone(&cell),
        }));
        let built = build(handle);
        let _ = cell.set(Box::new(Arc::clone(&built.node)));
        built
    }

    /// Rewrites the success value; failures pass through with their error
    /// and state intact.
    pub fn map<U: 'static>(self, f: impl Fn(T) -> U + Send + Sync + 'static) -> Parser<S, U> {
        Parser::from_node(Arc::new(MapNode {
            inner: self.node,
            f: Arc::new(f),
        }))
    }

    /// Rewrites the success value fallibly. An `Err` becomes an exception
    /// failure carrying the post-success state: the input consumed to get
    /// here stays consumed.
    pub fn try_map<U: 'static, E>(
        self,
        f: impl Fn(T) -> Result<U, E> + Send + Sync + 'static,
    ) -> Parser<S, U>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Parser::from_node(Arc::new(TryMapNode {
            inner: self.node,
            f: Arc::new(move |value| f(value).map_err(ParseError::exception)),
        }))
    }

    /// Monadic sequencing: on success, `next` picks the parser to continue
    /// with from the produced value; it runs against the resumed state. On
    /// failure the chain short-circuits.
    pub fn and_then<U: 'static>(
        self,
        next: impl Fn(T) -> Parser<S, U> + Send + Sync + 'static,
    ) -> Parser<S, U> {
        Parser::from_node(Arc::new(BindNode {
            inner: self.node,
            make: Arc::new(next),
        }))
    }

    /// Runs `self`, discards its value, then runs `next`.
    pub fn then<U: 'static>(self, next: Parser<S, U>) -> Parser<S, U> {
        self.and_then(move |_| next.clone())
    }

    /// Runs `self`, then `next`, keeping the first value.
    pub fn skip<U: 'static>(self, next: Parser<S, U>) -> Parser<S, T>
    where
        T: Clone + Send + Sync,
    {
        self.and_then(move |value| next.clone().map(move |_| value.clone()))
    }

    /// Left-biased alternation: if `self` fails, `alternative` runs from
    /// the state `self` started at — the failing branch leaks no
    /// consumption, however far it probed.
    pub fn or(self, alternative: Self) -> Self {
        Self::from_node(Arc::new(OrNode {
            first: self.node,
            second: alternative.node,
        }))
    }

    /// Intercepts a failure: `handler` picks a replacement parser from the
    /// error, which runs from the failure state. Successes pass through.
    pub fn recover_with(
        self,
        handler: impl Fn(&ParseError) -> Self + Send + Sync + 'static,
    ) -> Self {
        Self::from_node(Arc::new(RecoverNode {
            inner: self.node,
            handler: Arc::new(handler),
        }))
    }

    /// Runs the parser from `state`, leaving the stream resource alone.
    ///
    /// This is the raw engine entry; prefer [`parse`](Self::parse) or
    /// [`parse_partially`](Self::parse_partially) at the outermost level.
    pub fn run(&self, state: S) -> ParseResult<T, S> {
        match run_loop(Arc::clone(&self.node), state) {
            Outcome::Ok(value, rest) => ParseResult::Success {
                value: retype::<T>(value),
                rest,
            },
            Outcome::Err(error, at) => ParseResult::Failure { error, at },
        }
    }

    /// Parses `state` to a final result and releases the stream resource.
    ///
    /// A read error recorded by the stream wins over whatever the grammar
    /// made of the truncated input.
    pub fn parse(&self, state: S) -> ParseResult<T, S> {
        let result = surface_stream_error(self.run(state));
        result.state().dispose();
        result
    }

    /// Parses only as much of `state` as the grammar needs, leaving the
    /// remainder live for a later, independent parse.
    pub fn parse_partially(&self, state: S) -> PartialResult<T, S> {
        PartialResult::new(surface_stream_error(self.run(state)))
    }
}

/// A recursive parser family indexed by an argument.
///
/// Produced by [`fix_fn`]; calling it instantiates the parser for one
/// argument without rebuilding the recursive closure itself.
pub struct RecFn<A, S: ParseState, T> {
    build: Arc<dyn Fn(&RecFn<A, S, T>, A) -> Parser<S, T> + Send + Sync>,
}

impl<A, S: ParseState, T> Clone for RecFn<A, S, T> {
    fn clone(&self) -> Self {
        Self {
            build: Arc::clone(&self.build),
        }
    }
}

impl<A, S, T> RecFn<A, S, T>
where
    A: Clone + Send + Sync + 'static,
    S: ParseState,
    T: 'static,
{
    /// Instantiates the parser for `arg`. Construction is deferred to
    /// first use, so the definition can call itself for other arguments
    /// without recursing at build time.
    pub fn call(&self, arg: A) -> Parser<S, T> {
        let this = self.clone();
        Parser::lazy(move || (this.build)(&this, arg.clone()))
    }
}

/// The parameterized fix-point: a recursive parser definition indexed by an
/// argument (a nesting depth, a rule name), without rebuilding the whole
/// recursive closure per distinct argument.
pub fn fix_fn<A, S, T>(
    build: impl Fn(&RecFn<A, S, T>, A) -> Parser<S, T> + Send + Sync + 'static,
) -> RecFn<A, S, T>
where
    A: Clone + Send + Sync + 'static,
    S: ParseState,
    T: 'static,
{
    RecFn {
        build: Arc::new(build),
    }
}

fn surface_stream_error<T, S: ParseState>(result: ParseResult<T, S>) -> ParseResult<T, S> {
    match result.state().pending_error() {
        Some(error) => {
            let at = result.into_state();
            ParseResult::Failure {
                error: ParseError::exception(error),
                at,
            }
        }
        None => result,
    }
}

// ---- nodes ----

struct Pure<T> {
    value: T,
}

impl<S: ParseState, T: Clone + Send + Sync + 'static> Execute<S> for Pure<T> {
    fn execute(&self, state: S, _stack: &mut Vec<Frame<S>>) -> Transition<S> {
        Transition::Yield(Outcome::Ok(Box::new(self.value.clone()), state))
    }
}

struct Fail {
    error: ParseError,
}

impl<S: ParseState> Execute<S> for Fail {
    fn execute(&self, state: S, _stack: &mut Vec<Frame<S>>) -> Transition<S> {
        Transition::Yield(Outcome::Err(self.error.clone(), state))
    }
}

struct MapNode<S: ParseState, T, U> {
    inner: ExecRef<S>,
    f: Arc<dyn Fn(T) -> U + Send + Sync>,
}

impl<S: ParseState, T: 'static, U: 'static> Execute<S> for MapNode<S, T, U> {
    fn execute(&self, state: S, stack: &mut Vec<Frame<S>>) -> Transition<S> {
        let f = Arc::clone(&self.f);
        stack.push(Frame::Map(Box::new(move |value| {
            Ok(Box::new(f(retype::<T>(value))) as AnyVal)
        })));
        Transition::Call(Arc::clone(&self.inner), state)
    }
}

struct TryMapNode<S: ParseState, T, U> {
    inner: ExecRef<S>,
    f: Arc<dyn Fn(T) -> Result<U, ParseError> + Send + Sync>,
}

impl<S: ParseState, T: 'static, U: 'static> Execute<S> for TryMapNode<S, T, U> {
    fn execute(&self, state: S, stack: &mut Vec<Frame<S>>) -> Transition<S> {
        let f = Arc::clone(&self.f);
        stack.push(Frame::Map(Box::new(move |value| {
            f(retype::<T>(value)).map(|value| Box::new(value) as AnyVal)
        })));
        Transition::Call(Arc::clone(&self.inner), state)
    }
}

struct BindNode<S: ParseState, T, U> {
    inner: ExecRef<S>,
    make: Arc<dyn Fn(T) -> Parser<S, U> + Send + Sync>,
}

impl<S: ParseState, T: 'static, U: 'static> Execute<S> for BindNode<S, T, U> {
    fn execute(&self, state: S, stack: &mut Vec<Frame<S>>) -> Transition<S> {
        let make = Arc::clone(&self.make);
        stack.push(Frame::Then(Box::new(move |value| {
            make(retype::<T>(value)).node
        })));
        Transition::Call(Arc::clone(&self.inner), state)
    }
}

struct OrNode<S: ParseState> {
    first: ExecRef<S>,
    second: ExecRef<S>,
}

impl<S: ParseState> Execute<S> for OrNode<S> {
    fn execute(&self, state: S, stack: &mut Vec<Frame<S>>) -> Transition<S> {
        stack.push(Frame::Or {
            alternative: Arc::clone(&self.second),
            saved: state.clone(),
        });
        Transition::Call(Arc::clone(&self.first), state)
    }
}

struct RecoverNode<S: ParseState, T> {
    inner: ExecRef<S>,
    handler: Arc<dyn Fn(&ParseError) -> Parser<S, T> + Send + Sync>,
}

impl<S: ParseState, T: 'static> Execute<S> for RecoverNode<S, T> {
    fn execute(&self, state: S, stack: &mut Vec<Frame<S>>) -> Transition<S> {
        let handler = Arc::clone(&self.handler);
        stack.push(Frame::Recover(Box::new(move |error| handler(&error).node)));
        Transition::Call(Arc::clone(&self.inner), state)
    }
}

struct Lazy<S: ParseState, T> {
    cell: OnceBox<ExecRef<S>>,
    build: Arc<dyn Fn() -> Parser<S, T> + Send + Sync>,
}

impl<S: ParseState, T: 'static> Execute<S> for Lazy<S, T> {
    fn execute(&self, state: S, _stack: &mut Vec<Frame<S>>) -> Transition<S> {
        let node = self.cell.get_or_init(|| Box::new((self.build)().node));
        Transition::Call(Arc::clone(node), state)
    }
}

struct Knot<S: ParseState> {
    cell: Arc<OnceBox<ExecRef<S>>>,
}

impl<S: ParseState> Execute<S> for Knot<S> {
    fn execute(&self, state: S, _stack: &mut Vec<Frame<S>>) -> Transition<S> {
        match self.cell.get() {
            Some(node) => Transition::Call(Arc::clone(node), state),
            // Only reachable by running the handle inside its own builder.
            None => Transition::Yield(Outcome::Err(
                ParseError::Message("recursive parser used during its own construction".into()),
                state,
            )),
        }
    }
}
