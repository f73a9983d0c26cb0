//! Fixed-size chunking of lazy sequences.

use std::iter::FusedIterator;
use std::num::NonZeroUsize;

/// One batch of consecutive items plus the number of items emitted so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk<T> {
    /// Items in source order.
    pub items: Vec<T>,
    /// Items emitted up to and including this chunk.
    pub cumulative: usize,
}

impl<T> Chunk<T> {
    /// 1-based index of the first item in this chunk.
    pub fn first_index(&self) -> usize {
        self.cumulative - self.items.len() + 1
    }

    /// 1-based index of the last item in this chunk.
    pub fn last_index(&self) -> usize {
        self.cumulative
    }

    /// Number of items in this chunk.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false for chunks produced by [`Chunks`].
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Iterator adapter yielding [`Chunk`]s of at most `size` items.
///
/// The source is pulled incrementally; only the chunk being built is held
/// in memory. Every chunk but the last holds exactly `size` items and no
/// empty chunk is ever produced.
#[derive(Debug, Clone)]
pub struct Chunks<I> {
    source: I,
    size: NonZeroUsize,
    emitted: usize,
    exhausted: bool,
}

/// Split `source` into chunks of `size` items.
///
/// ```
/// use std::num::NonZeroUsize;
/// use ferro_myvariant::batch::chunk;
///
/// let size = NonZeroUsize::new(2).unwrap();
/// let chunks: Vec<_> = chunk(1..=5, size).collect();
/// assert_eq!(chunks.len(), 3);
/// assert_eq!(chunks[0].items, vec![1, 2]);
/// assert_eq!(chunks[2].items, vec![5]);
/// assert_eq!(chunks[2].cumulative, 5);
/// ```
pub fn chunk<I: IntoIterator>(source: I, size: NonZeroUsize) -> Chunks<I::IntoIter> {
    Chunks {
        source: source.into_iter(),
        size,
        emitted: 0,
        exhausted: false,
    }
}

impl<I: Iterator> Iterator for Chunks<I> {
    type Item = Chunk<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let items: Vec<I::Item> = self.source.by_ref().take(self.size.get()).collect();
        if items.len() < self.size.get() {
            // Do not poll a drained source again
            self.exhausted = true;
        }
        if items.is_empty() {
            return None;
        }

        self.emitted += items.len();
        Some(Chunk {
            items,
            cumulative: self.emitted,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.exhausted {
            return (0, Some(0));
        }
        let size = self.size.get();
        let (lower, upper) = self.source.size_hint();
        (
            lower.div_ceil(size),
            upper.map(|upper| upper.div_ceil(size)),
        )
    }
}

impl<I: Iterator> FusedIterator for Chunks<I> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_exact_multiple() {
        let chunks: Vec<_> = chunk(0..6, size(3)).collect();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].items, vec![0, 1, 2]);
        assert_eq!(chunks[1].items, vec![3, 4, 5]);
        assert_eq!(chunks[1].cumulative, 6);
    }

    #[test]
    fn test_remainder() {
        let chunks: Vec<_> = chunk(vec!["a", "b", "c", "d"], size(3)).collect();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].items, vec!["d"]);
        assert_eq!(chunks[1].first_index(), 4);
        assert_eq!(chunks[1].last_index(), 4);
    }

    #[test]
    fn test_empty_source() {
        let mut chunks = chunk(Vec::<u8>::new(), size(4));
        assert!(chunks.next().is_none());
        assert!(chunks.next().is_none());
    }

    #[test]
    fn test_size_larger_than_source() {
        let chunks: Vec<_> = chunk(0..3, size(1000)).collect();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 3);
        assert_eq!(chunks[0].first_index(), 1);
    }

    #[test]
    fn test_unbounded_source_is_pulled_lazily() {
        let mut chunks = chunk(0.., size(2));
        assert_eq!(chunks.next().unwrap().items, vec![0, 1]);
        assert_eq!(chunks.next().unwrap().items, vec![2, 3]);
        assert_eq!(chunks.next().unwrap().cumulative, 6);
    }

    #[test]
    fn test_drained_source_not_polled_again() {
        let mut polls = 0;
        let source = std::iter::from_fn(|| {
            polls += 1;
            if polls <= 3 {
                Some(polls)
            } else {
                None
            }
        });
        let chunks: Vec<_> = chunk(source, size(2)).collect();
        assert_eq!(chunks.len(), 2);
        // 3 items + one None when filling the short chunk
        assert_eq!(polls, 4);
    }

    #[test]
    fn test_size_hint() {
        let chunks = chunk(0..10, size(4));
        assert_eq!(chunks.size_hint(), (3, Some(3)));
    }
}
