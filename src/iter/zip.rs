//! Synchronized traversal over a tuple of sources
//!
//! Advancing never consumes more than needed to decide termination: every
//! source is first asked the cheap three-valued `is_done`; a definite `true`
//! stops immediately, then sources answering "unknown" are advanced, and only
//! after all of them produced a value are the remaining sources advanced.
//! A stateful source later in the tuple is therefore not popped when an
//! earlier source is already exhausted.

use super::{zip_size, ElementType, IterError, Iterate, Reversible, SizeCategory};

/// Tuples of iterators that can be traversed in lockstep.
pub trait ZipSources {
    /// Tuple of element types.
    type Item;
    /// Tuple of component states.
    type State: Clone;

    /// Component start states.
    fn start(&self) -> Self::State;

    /// Advance every component, or report exhaustion.
    fn advance(&self, state: Self::State) -> Option<(Self::Item, Self::State)>;

    /// Combined three-valued exhaustion check.
    fn is_done(&self, state: &Self::State) -> Option<bool>;

    /// Component size categories, in order.
    fn sizes(&self) -> Vec<SizeCategory>;

    /// Component element types, in order.
    fn element_types(&self) -> Vec<ElementType>;
}

/// Tuples of reversible iterators.
pub trait ZipReversible: ZipSources {
    /// Tuple of component reverse states.
    type RevState: Clone;

    /// Component reverse start states.
    fn rev_start(&self) -> Self::RevState;

    /// Advance every component backwards.
    fn rev_advance(&self, state: Self::RevState) -> Option<(Self::Item, Self::RevState)>;

    /// Every component must itself be reversible.
    fn check_components(&self) -> Result<(), IterError>;
}

/// Lockstep traversal of a tuple of iterators.
#[derive(Debug, Clone)]
pub struct Zip<S> {
    sources: S,
}

/// Zip the iterators in `sources` (a tuple of up to six iterators).
///
/// The empty tuple zips into an infinite sequence of `()`.
pub fn zip<S: ZipSources>(sources: S) -> Zip<S> {
    Zip { sources }
}

impl<S: ZipSources> Iterate for Zip<S> {
    type Item = S::Item;
    type State = S::State;

    fn start(&self) -> S::State {
        self.sources.start()
    }

    fn next(&self, state: S::State) -> Option<(S::Item, S::State)> {
        self.sources.advance(state)
    }

    fn size(&self) -> SizeCategory {
        zip_size(&self.sources.sizes())
    }

    fn element_type(&self) -> ElementType {
        ElementType::all_known::<S::Item>(&self.sources.element_types())
    }

    fn is_done(&self, state: &S::State) -> Option<bool> {
        self.sources.is_done(state)
    }
}

impl<S: ZipReversible> Reversible for Zip<S> {
    type RevState = S::RevState;

    /// Backwards lockstep only lines up when every component has the same,
    /// statically known, finite length.
    fn check_reversible(&self) -> Result<(), IterError> {
        self.sources.check_components()?;
        let sizes = self.sources.sizes();
        let mut lengths = sizes.iter().map(|s| {
            s.length().map_err(|_| {
                IterError::UnsupportedReverse(format!(
                    "zip component has size {}, lengths must be finite and equal",
                    s
                ))
            })
        });
        let first = match lengths.next() {
            Some(len) => len?,
            None => {
                return Err(IterError::UnsupportedReverse(
                    "zip of no iterators is infinite".to_string(),
                ))
            }
        };
        for len in lengths {
            let len = len?;
            if len != first {
                return Err(IterError::UnsupportedReverse(format!(
                    "zip components have unequal lengths {} and {}",
                    first, len
                )));
            }
        }
        Ok(())
    }

    fn rev_start(&self) -> S::RevState {
        self.sources.rev_start()
    }

    fn rev_next(&self, state: S::RevState) -> Option<(S::Item, S::RevState)> {
        self.sources.rev_advance(state)
    }
}

impl ZipSources for () {
    type Item = ();
    type State = ();

    fn start(&self) {}

    fn advance(&self, _state: ()) -> Option<((), ())> {
        Some(((), ()))
    }

    fn is_done(&self, _state: &()) -> Option<bool> {
        Some(false)
    }

    fn sizes(&self) -> Vec<SizeCategory> {
        Vec::new()
    }

    fn element_types(&self) -> Vec<ElementType> {
        Vec::new()
    }
}

macro_rules! zip_tuple {
    ($($T:ident $s:ident $d:ident $r:ident $idx:tt),+) => {
        impl<$($T: Iterate),+> ZipSources for ($($T,)+) {
            type Item = ($($T::Item,)+);
            type State = ($($T::State,)+);

            fn start(&self) -> Self::State {
                ($(self.$idx.start(),)+)
            }

            fn advance(&self, state: Self::State) -> Option<(Self::Item, Self::State)> {
                let ($($s,)+) = state;
                $(let $d = self.$idx.is_done(&$s);)+
                if false $(|| $d == Some(true))+ {
                    return None;
                }
                // sources that cannot answer cheaply go first
                $(let mut $r = None;)+
                $(
                    if $d.is_none() {
                        $r = Some(self.$idx.next($s.clone())?);
                    }
                )+
                $(
                    if $d.is_some() {
                        $r = Some(self.$idx.next($s.clone())?);
                    }
                )+
                $(let $r = $r?;)+
                Some((($($r.0,)+), ($($r.1,)+)))
            }

            fn is_done(&self, state: &Self::State) -> Option<bool> {
                let answers = [$(self.$idx.is_done(&state.$idx)),+];
                if answers.iter().any(|a| *a == Some(true)) {
                    Some(true)
                } else if answers.iter().all(|a| *a == Some(false)) {
                    Some(false)
                } else {
                    None
                }
            }

            fn sizes(&self) -> Vec<SizeCategory> {
                vec![$(self.$idx.size()),+]
            }

            fn element_types(&self) -> Vec<ElementType> {
                vec![$(self.$idx.element_type()),+]
            }
        }

        impl<$($T: Reversible),+> ZipReversible for ($($T,)+) {
            type RevState = ($($T::RevState,)+);

            fn rev_start(&self) -> Self::RevState {
                ($(self.$idx.rev_start(),)+)
            }

            fn rev_advance(&self, state: Self::RevState) -> Option<(Self::Item, Self::RevState)> {
                let ($($s,)+) = state;
                $(let $r = self.$idx.rev_next($s)?;)+
                Some((($($r.0,)+), ($($r.1,)+)))
            }

            fn check_components(&self) -> Result<(), IterError> {
                $(self.$idx.check_reversible()?;)+
                Ok(())
            }
        }
    };
}

zip_tuple!(A sa da ra 0);
zip_tuple!(A sa da ra 0, B sb db rb 1);
zip_tuple!(A sa da ra 0, B sb db rb 1, C sc dc rc 2);
zip_tuple!(A sa da ra 0, B sb db rb 1, C sc dc rc 2, D sd dd rd 3);
zip_tuple!(A sa da ra 0, B sb db rb 1, C sc dc rc 2, D sd dd rd 3, E se de re 4);
zip_tuple!(A sa da ra 0, B sb db rb 1, C sc dc rc 2, D sd dd rd 3, E se de re 4, F sf df rf 5);
