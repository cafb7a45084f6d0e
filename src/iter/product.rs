//! Cartesian product with the first source varying fastest

use super::{product_size, ElementType, Iterate, SizeCategory};

/// Tuples of iterators whose combinations can be enumerated.
pub trait ProductSources {
    /// Tuple of element types.
    type Item: Clone;
    /// Tuple of component states.
    type States: Clone;

    /// First combination: every component at its first element.
    fn first(&self) -> Option<(Self::Item, Self::States)>;

    /// Ripple-carry advance from the combination `values` at `states`.
    fn advance(
        &self,
        values: Self::Item,
        states: Self::States,
    ) -> Option<(Self::Item, Self::States)>;

    /// Combined three-valued exhaustion check on component states.
    fn is_done(&self, states: &Self::States) -> Option<bool>;

    /// Component size categories, in order.
    fn sizes(&self) -> Vec<SizeCategory>;

    /// Component element types, in order.
    fn element_types(&self) -> Vec<ElementType>;
}

/// Every combination of one element from each source.
#[derive(Debug, Clone)]
pub struct Product<S> {
    sources: S,
}

/// Product state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductState<V, S> {
    /// No combination produced yet.
    Fresh,
    /// Last produced combination and the component states after it.
    Running(V, S),
}

/// Cartesian product of a tuple of up to six iterators.
pub fn product<S: ProductSources>(sources: S) -> Product<S> {
    Product { sources }
}

impl<S: ProductSources> Iterate for Product<S> {
    type Item = S::Item;
    type State = ProductState<S::Item, S::States>;

    fn start(&self) -> Self::State {
        ProductState::Fresh
    }

    fn next(&self, state: Self::State) -> Option<(S::Item, Self::State)> {
        let (values, states) = match state {
            ProductState::Fresh => self.sources.first()?,
            ProductState::Running(values, states) => self.sources.advance(values, states)?,
        };
        Some((values.clone(), ProductState::Running(values, states)))
    }

    fn size(&self) -> SizeCategory {
        product_size(&self.sources.sizes())
    }

    fn element_type(&self) -> ElementType {
        ElementType::all_known::<S::Item>(&self.sources.element_types())
    }

    fn is_done(&self, state: &Self::State) -> Option<bool> {
        match state {
            ProductState::Fresh if self.size().is_empty() => Some(true),
            ProductState::Fresh => None,
            ProductState::Running(_, states) => self.sources.is_done(states),
        }
    }
}

macro_rules! product_tuple {
    ($($T:ident $v:ident $s:ident $idx:tt),+) => {
        impl<$($T),+> ProductSources for ($($T,)+)
        where
            $($T: Iterate, $T::Item: Clone,)+
        {
            type Item = ($($T::Item,)+);
            type States = ($($T::State,)+);

            fn first(&self) -> Option<(Self::Item, Self::States)> {
                $(let ($v, $s) = self.$idx.next(self.$idx.start())?;)+
                Some((($($v,)+), ($($s,)+)))
            }

            #[allow(unused_assignments)]
            fn advance(
                &self,
                values: Self::Item,
                states: Self::States,
            ) -> Option<(Self::Item, Self::States)> {
                let ($(mut $v,)+) = values;
                let ($(mut $s,)+) = states;
                'ripple: {
                    $(
                        if self.$idx.is_done(&$s) != Some(true) {
                            if let Some((value, state)) = self.$idx.next($s.clone()) {
                                $v = value;
                                $s = state;
                                break 'ripple;
                            }
                        }
                        // wrapped: restart this component and carry
                        let (value, state) = self.$idx.next(self.$idx.start())?;
                        $v = value;
                        $s = state;
                    )+
                    return None;
                }
                Some((($($v,)+), ($($s,)+)))
            }

            /// Done once every component is at its end; not done while any
            /// component can still advance.
            fn is_done(&self, states: &Self::States) -> Option<bool> {
                let answers = [$(self.$idx.is_done(&states.$idx)),+];
                if answers.iter().any(|a| *a == Some(false)) {
                    Some(false)
                } else if answers.iter().all(|a| *a == Some(true)) {
                    Some(true)
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
    };
}

product_tuple!(A va sa 0);
product_tuple!(A va sa 0, B vb sb 1);
product_tuple!(A va sa 0, B vb sb 1, C vc sc 2);
product_tuple!(A va sa 0, B vb sb 1, C vc sc 2, D vd sd 3);
product_tuple!(A va sa 0, B vb sb 1, C vc sc 2, D vd sd 3, E ve se 4);
product_tuple!(A va sa 0, B vb sb 1, C vc sc 2, D vd sd 3, E ve se 4, F vf sf 5);
