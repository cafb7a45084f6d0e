use std::fmt;

use super::{IterError, Iterate, SizeCategory};

/// Running fold: every element is the accumulator after folding in one more
/// source element.
#[derive(Clone)]
pub struct Accumulate<I, F, A, G> {
    inner: I,
    f: F,
    seed: Seed<A, G>,
}

/// How the first element becomes an accumulator.
#[derive(Debug, Clone)]
enum Seed<A, G> {
    /// Combined with the first element through the fold function.
    Init(A),
    /// Taken as-is (converted) without calling the fold function.
    Raw(G),
}

impl<I: fmt::Debug, F, A: fmt::Debug, G> fmt::Debug for Accumulate<I, F, A, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let init = match &self.seed {
            Seed::Init(init) => Some(init),
            Seed::Raw(_) => None,
        };
        f.debug_struct("Accumulate")
            .field("inner", &self.inner)
            .field("init", &init)
            .finish_non_exhaustive()
    }
}

/// Accumulator state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccumulateState<A, S> {
    /// Nothing produced yet; the seed has not been combined.
    First(S),
    /// Accumulator after the most recent element.
    Running(A, S),
}

/// `x1, f(x1, x2), f(f(x1, x2), x3), ...`; the first raw element is the seed.
#[allow(clippy::type_complexity)]
pub fn accumulate<I, F>(f: F, it: I) -> Accumulate<I, F, I::Item, fn(I::Item) -> I::Item>
where
    I: Iterate,
    I::Item: Clone,
    F: Fn(I::Item, I::Item) -> I::Item,
{
    Accumulate {
        inner: it,
        f,
        seed: Seed::Raw(std::convert::identity as fn(I::Item) -> I::Item),
    }
}

/// `f(init, x1), f(f(init, x1), x2), ...`
pub fn accumulate_from<A, I, F>(
    f: F,
    it: I,
    init: A,
) -> Accumulate<I, F, A, fn(I::Item) -> A>
where
    I: Iterate,
    A: Clone,
    F: Fn(A, I::Item) -> A,
{
    Accumulate {
        inner: it,
        f,
        seed: Seed::Init(init),
    }
}

impl<A, I, F, G> Iterate for Accumulate<I, F, A, G>
where
    I: Iterate,
    A: Clone,
    F: Fn(A, I::Item) -> A,
    G: Fn(I::Item) -> A,
{
    type Item = A;
    type State = AccumulateState<A, I::State>;

    fn start(&self) -> Self::State {
        AccumulateState::First(self.inner.start())
    }

    fn next(&self, state: Self::State) -> Option<(A, Self::State)> {
        let (acc, state) = match state {
            AccumulateState::First(state) => {
                let (value, state) = self.inner.next(state)?;
                let acc = match &self.seed {
                    Seed::Init(init) => (self.f)(init.clone(), value),
                    Seed::Raw(raw) => raw(value),
                };
                (acc, state)
            }
            AccumulateState::Running(acc, state) => {
                let (value, state) = self.inner.next(state)?;
                ((self.f)(acc, value), state)
            }
        };
        Some((acc.clone(), AccumulateState::Running(acc, state)))
    }

    fn size(&self) -> SizeCategory {
        self.inner.size()
    }

    fn is_done(&self, state: &Self::State) -> Option<bool> {
        match state {
            AccumulateState::First(state) | AccumulateState::Running(_, state) => {
                self.inner.is_done(state)
            }
        }
    }

    fn length(&self) -> Result<usize, IterError> {
        self.inner.length()
    }
}
