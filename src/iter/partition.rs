//! Fixed-width chunking

use super::{
    checked_count, nth_index, partition_size, ElementType, Indexed, IterError, Iterate,
    Reversible, Seq, SizeCategory,
};

/// Successive chunks of `n` elements; the final chunk may be shorter.
///
/// Each chunk is a freshly filled buffer. Use [`Seq::partition`] for
/// zero-copy views over shared storage.
#[derive(Debug, Clone)]
pub struct Partition<I> {
    inner: I,
    n: usize,
}

/// Partition state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionState<S> {
    /// More chunks may follow.
    Running(S),
    /// The previous chunk came up short because the source ended; the source
    /// is not touched again.
    Short,
}

fn chunk_width(n: isize) -> Result<usize, IterError> {
    match checked_count("partition", n)? {
        0 => Err(IterError::InvalidArgument {
            operation: "partition",
            reason: "chunk width must be at least 1".to_string(),
        }),
        width => Ok(width),
    }
}

/// Chunks of `n` elements of `it`.
pub fn partition<I: Iterate>(it: I, n: isize) -> Result<Partition<I>, IterError> {
    Ok(Partition {
        inner: it,
        n: chunk_width(n)?,
    })
}

impl<I: Iterate> Iterate for Partition<I> {
    type Item = Vec<I::Item>;
    type State = PartitionState<I::State>;

    fn start(&self) -> Self::State {
        PartitionState::Running(self.inner.start())
    }

    fn next(&self, state: Self::State) -> Option<(Vec<I::Item>, Self::State)> {
        let PartitionState::Running(mut state) = state else {
            return None;
        };
        let mut chunk = Vec::with_capacity(self.n);
        while chunk.len() < self.n {
            match self.inner.next(state.clone()) {
                Some((value, next)) => {
                    chunk.push(value);
                    state = next;
                }
                None if chunk.is_empty() => return None,
                None => return Some((chunk, PartitionState::Short)),
            }
        }
        Some((chunk, PartitionState::Running(state)))
    }

    fn size(&self) -> SizeCategory {
        partition_size(&self.inner.size(), self.n)
    }

    fn element_type(&self) -> ElementType {
        ElementType::all_known::<Self::Item>(&[self.inner.element_type()])
    }

    fn is_done(&self, state: &Self::State) -> Option<bool> {
        match state {
            PartitionState::Short => Some(true),
            PartitionState::Running(state) => self.inner.is_done(state),
        }
    }
}

/// Chunks of a [`Seq`] as views sharing its storage.
#[derive(Debug, Clone)]
pub struct SeqChunks<T> {
    seq: Seq<T>,
    n: usize,
}

impl<T> Seq<T> {
    /// Chunks of `n` elements as zero-copy views.
    pub fn partition(&self, n: isize) -> Result<SeqChunks<T>, IterError> {
        Ok(SeqChunks {
            seq: self.slice(0..self.len()),
            n: chunk_width(n)?,
        })
    }
}

impl<T> SeqChunks<T> {
    fn chunk(&self, index: usize) -> Option<Seq<T>> {
        let begin = index.checked_mul(self.n)?;
        (begin < self.seq.len()).then(|| self.seq.slice(begin..begin.saturating_add(self.n)))
    }

    fn count(&self) -> usize {
        let len = self.seq.len();
        len / self.n + usize::from(len % self.n > 0)
    }
}

impl<T: Clone> Iterate for SeqChunks<T> {
    type Item = Seq<T>;
    type State = usize;

    fn start(&self) -> usize {
        0
    }

    fn next(&self, index: usize) -> Option<(Seq<T>, usize)> {
        self.chunk(index).map(|view| (view, index + 1))
    }

    fn size(&self) -> SizeCategory {
        SizeCategory::HasLength(self.count())
    }

    fn element_type(&self) -> ElementType {
        ElementType::of::<Seq<T>>()
    }

    fn is_done(&self, index: &usize) -> Option<bool> {
        Some(*index >= self.count())
    }

    fn nth(&self, n: usize) -> Result<Seq<T>, IterError> {
        let index = nth_index(n, self.count())?;
        self.chunk(index)
            .ok_or_else(|| IterError::out_of_bounds(format!("chunk {}", n)))
    }
}

impl<T: Clone> Reversible for SeqChunks<T> {
    type RevState = usize;

    fn rev_start(&self) -> usize {
        self.count()
    }

    fn rev_next(&self, remaining: usize) -> Option<(Seq<T>, usize)> {
        let index = remaining.checked_sub(1)?;
        self.chunk(index).map(|view| (view, index))
    }
}

impl<T: Clone> Indexed for SeqChunks<T> {
    fn get(&self, index: usize) -> Option<Seq<T>> {
        self.chunk(index)
    }

    fn index_len(&self) -> usize {
        self.count()
    }
}
