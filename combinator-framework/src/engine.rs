//! The execution machine.
//!
//! A parser node never calls another parser on the native stack. Instead it
//! pushes a frame describing "what happens next" onto an explicit
//! continuation stack and requests a sub-parse; a single loop threads
//! outcomes back through the frames. Native stack depth stays constant no
//! matter how long the input or how deep the grammar recursion — frames
//! grow on the heap instead.
//!
//! The stream state stays fully generic and monomorphic through the run;
//! only intermediate values are type-erased, and each combinator re-types
//! them at its own boundary.

use std::any::Any;
use std::sync::Arc;

use stream_framework::ParseState;

use crate::result::ParseError;

/// A type-erased intermediate value travelling through the machine.
pub(crate) type AnyVal = Box<dyn Any>;

/// A shared, runnable parser node.
pub(crate) type ExecRef<S> = Arc<dyn Execute<S>>;

/// The capability every parser node implements: given the current state and
/// the continuation stack, either yield an outcome directly (leaves) or push
/// frames and request a sub-parse (combinators).
pub(crate) trait Execute<S: ParseState>: Send + Sync {
    fn execute(&self, state: S, stack: &mut Vec<Frame<S>>) -> Transition<S>;
}

/// What the machine does next.
pub(crate) enum Transition<S: ParseState> {
    /// Run a parser against a state, delivering its outcome to the stack.
    Call(ExecRef<S>, S),
    /// Deliver an outcome to the innermost frame.
    Yield(Outcome<S>),
}

/// An erased parse result.
pub(crate) enum Outcome<S: ParseState> {
    Ok(AnyVal, S),
    Err(ParseError, S),
}

/// A deferred continuation frame.
pub(crate) enum Frame<S: ParseState> {
    /// Sequencing: on success, build the next parser from the value and run
    /// it from the resumed state. Failures pass through unchanged.
    Then(Box<dyn FnOnce(AnyVal) -> ExecRef<S>>),
    /// Mapping: rewrite a success value, or demote it to a failure.
    Map(Box<dyn FnOnce(AnyVal) -> Result<AnyVal, ParseError>>),
    /// Alternation: on failure, run the alternative from the saved
    /// (pre-attempt) state, as if the failing branch had consumed nothing.
    Or { alternative: ExecRef<S>, saved: S },
    /// Failure interception: on failure, run a parser chosen from the
    /// error, continuing from the failure state.
    Recover(Box<dyn FnOnce(ParseError) -> ExecRef<S>>),
    /// Repetition until an iteration fails or stops consuming. `committed`
    /// is the state after the last kept iteration.
    Many {
        item: ExecRef<S>,
        acc: Vec<AnyVal>,
        committed: S,
    },
    /// Exactly `remaining` more successes; any failure propagates.
    Repeat {
        item: ExecRef<S>,
        acc: Vec<AnyVal>,
        remaining: usize,
    },
}

/// Runs `root` against `state` to completion.
pub(crate) fn run_loop<S: ParseState>(root: ExecRef<S>, state: S) -> Outcome<S> {
    let mut stack: Vec<Frame<S>> = Vec::new();
    let mut transition = Transition::Call(root, state);
    loop {
        transition = match transition {
            Transition::Call(parser, state) => parser.execute(state, &mut stack),
            Transition::Yield(outcome) => match stack.pop() {
                Some(frame) => resume(frame, outcome, &mut stack),
                None => return outcome,
            },
        };
    }
}

fn resume<S: ParseState>(
    frame: Frame<S>,
    outcome: Outcome<S>,
    stack: &mut Vec<Frame<S>>,
) -> Transition<S> {
    match (frame, outcome) {
        (Frame::Then(next), Outcome::Ok(value, state)) => Transition::Call(next(value), state),
        (Frame::Then(_), failed @ Outcome::Err(..)) => Transition::Yield(failed),

        (Frame::Map(rewrite), Outcome::Ok(value, state)) => Transition::Yield(match rewrite(value)
        {
            Ok(value) => Outcome::Ok(value, state),
            Err(error) => Outcome::Err(error, state),
        }),
        (Frame::Map(_), failed @ Outcome::Err(..)) => Transition::Yield(failed),

        (Frame::Or { alternative, saved }, Outcome::Err(..)) => {
            Transition::Call(alternative, saved)
        }
        (Frame::Or { .. }, succeeded @ Outcome::Ok(..)) => Transition::Yield(succeeded),

        (Frame::Recover(handler), Outcome::Err(error, state)) => {
            Transition::Call(handler(error), state)
        }
        (Frame::Recover(_), succeeded @ Outcome::Ok(..)) => Transition::Yield(succeeded),

        (
            Frame::Many {
                item,
                mut acc,
                committed,
            },
            outcome,
        ) => match outcome {
            Outcome::Ok(value, state) => {
                let progressed = state.offset() > committed.offset();
                acc.push(value);
                if progressed {
                    stack.push(Frame::Many {
                        item: Arc::clone(&item),
                        acc,
                        committed: state.clone(),
                    });
                    Transition::Call(item, state)
                } else {
                    // A zero-width success would repeat forever; keep it
                    // once and stop.
                    Transition::Yield(Outcome::Ok(Box::new(acc), state))
                }
            }
            Outcome::Err(..) => Transition::Yield(Outcome::Ok(Box::new(acc), committed)),
        },

        (
            Frame::Repeat {
                item,
                mut acc,
                remaining,
            },
            outcome,
        ) => match outcome {
            Outcome::Ok(value, state) => {
                acc.push(value);
                if remaining > 1 {
                    stack.push(Frame::Repeat {
                        item: Arc::clone(&item),
                        acc,
                        remaining: remaining - 1,
                    });
                    Transition::Call(item, state)
                } else {
                    Transition::Yield(Outcome::Ok(Box::new(acc), state))
                }
            }
            failed @ Outcome::Err(..) => Transition::Yield(failed),
        },
    }
}

/// Re-types a value at a combinator boundary. The typed [`Parser`] wrappers
/// guarantee the payload type, so a mismatch cannot happen at runtime.
///
/// [`Parser`]: crate::parser::Parser
pub(crate) fn retype<T: 'static>(value: AnyVal) -> T {
    match value.downcast::<T>() {
        Ok(boxed) => *boxed,
        Err(_) => unreachable!("parser machine produced a value of the wrong type"),
    }
}

/// The frame that converts an accumulated `Vec` of erased values back into
/// `Vec<T>`; pushed beneath a `Many`/`Repeat` frame.
pub(crate) fn collect_frame<S: ParseState, T: 'static>() -> Frame<S> {
    Frame::Map(Box::new(|value| {
        let items = retype::<Vec<AnyVal>>(value);
        Ok(Box::new(items.into_iter().map(retype::<T>).collect::<Vec<T>>()) as AnyVal)
    }))
}
