use super::{ElementType, IterError, Iterate, Reversible, SizeCategory};

/// Backwards traversal of a [`Reversible`] iterator.
///
/// Reversibility is a capability: iterators without a backwards protocol do
/// not implement [`Reversible`] at all, and those whose reversibility depends
/// on lengths (zip, enumerate, take, drop) are checked when the wrapper is
/// built.
#[derive(Debug, Clone)]
pub struct Reverse<I> {
    inner: I,
}

/// Reverse `it`, failing with `UnsupportedReverse` when the run-time check fails.
pub fn reverse<I: Reversible>(it: I) -> Result<Reverse<I>, IterError> {
    it.check_reversible()?;
    Ok(Reverse { inner: it })
}

impl<I> Reverse<I> {
    /// Unwrap the forward iterator.
    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<I: Reversible> Iterate for Reverse<I> {
    type Item = I::Item;
    type State = I::RevState;

    fn start(&self) -> I::RevState {
        self.inner.rev_start()
    }

    fn next(&self, state: I::RevState) -> Option<(I::Item, I::RevState)> {
        self.inner.rev_next(state)
    }

    fn size(&self) -> SizeCategory {
        self.inner.size()
    }

    fn element_type(&self) -> ElementType {
        self.inner.element_type()
    }

    fn constant_item(&self) -> Option<I::Item> {
        self.inner.constant_item()
    }
}

impl<I: Reversible> Reversible for Reverse<I> {
    type RevState = I::State;

    fn check_reversible(&self) -> Result<(), IterError> {
        self.inner.check_reversible()
    }

    fn rev_start(&self) -> I::State {
        self.inner.start()
    }

    fn rev_next(&self, state: I::State) -> Option<(I::Item, I::State)> {
        self.inner.next(state)
    }
}
