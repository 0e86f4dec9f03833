#![forbid(unsafe_code)]

//! Multi-range snapshot assembly.

use ahash::AHashMap;

/// A materialized view over several disjoint index ranges.
///
/// Built by [`crate::QueryStore::get_snapshot`] from one page fetch per
/// requested range. [`added`](Snapshot::added) walks every requested
/// absolute index in range order, including indices past the end of the
/// data; [`get`](Snapshot::get) resolves an index to its document and
/// returns `None` both for indices outside the requested ranges and for
/// requested indices the store had no row for.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    indices: Vec<usize>,
    items: AHashMap<usize, T>,
}

impl<T> Snapshot<T> {
    /// Zips requested ranges with their fetched pages. Ranges are
    /// inclusive; a page shorter than its range leaves the tail indices
    /// present but unresolvable.
    #[must_use]
    pub(crate) fn assemble(ranges: &[(usize, usize)], pages: Vec<Vec<T>>) -> Self {
        let mut indices = Vec::new();
        let mut items = AHashMap::new();
        for (&(from, to), page) in ranges.iter().zip(pages) {
            let mut docs = page.into_iter();
            for index in from..=to {
                indices.push(index);
                if let Some(doc) = docs.next() {
                    items.insert(index, doc);
                }
            }
        }
        Self { indices, items }
    }

    /// Requested absolute indices, in range order.
    pub fn added(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    /// The document at an absolute index, if one was fetched for it.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(&index)
    }

    /// Number of requested indices (not of resolved documents).
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
