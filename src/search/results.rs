use std::slice;
use crate::core::types::{DocId, PrimaryKeys};
use crate::scoring::rsv::Rsv;

/// One ranked result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedDocument<'k, T> {
    pub document_id: DocId,
    pub primary_key: &'k str,   // External identifier from the caller's key table
    pub rsv: T,                 // Accumulated retrieval status value
}

/// Single-pass iterator over the sorted top-k, best first.
pub struct Results<'a, 'k, T: Rsv> {
    slots: slice::Iter<'a, usize>,
    scores: &'a [T],
    primary_keys: &'k PrimaryKeys,
}

impl<'a, 'k, T: Rsv> Results<'a, 'k, T> {
    pub(crate) fn new(slots: &'a [usize], scores: &'a [T], primary_keys: &'k PrimaryKeys) -> Self {
        Results {
            slots: slots.iter(),
            scores,
            primary_keys,
        }
    }
}

impl<'a, 'k, T: Rsv> Iterator for Results<'a, 'k, T> {
    type Item = RankedDocument<'k, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = *self.slots.next()?;
        Some(RankedDocument {
            document_id: DocId(slot),
            primary_key: self.primary_keys[slot].as_str(),
            rsv: self.scores[slot],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl<'a, 'k, T: Rsv> ExactSizeIterator for Results<'a, 'k, T> {}
