use crate::scoring::rsv::Rsv;

/// Block shift for a collection: `floor(log2(sqrt(documents)))`.
///
/// Makes both the flag array and the cost of zeroing one block O(sqrt(N)).
pub fn block_shift(documents: usize) -> u32 {
    let root = documents.isqrt();
    if root == 0 { 0 } else { root.ilog2() }
}

/// One score slot per document, cleared lazily a block at a time.
///
/// A block's flag is unset when its slots may still hold scores from a
/// previous query; the block is zeroed the first time the current query
/// touches it. `rewind` only resets the flags.
pub struct Accumulators<T: Rsv> {
    scores: Vec<T>,
    clean_flags: Vec<bool>,
    shift: u32,
    width: usize,
    documents: usize,
}

impl<T: Rsv> Accumulators<T> {
    pub fn new(documents: usize) -> Self {
        let shift = block_shift(documents);
        let width = 1usize << shift;
        let blocks = documents.div_ceil(width).max(1);

        Accumulators {
            scores: vec![T::zero(); width * blocks],
            clean_flags: vec![false; blocks],
            shift,
            width,
            documents,
        }
    }

    #[inline]
    pub fn block_of(&self, document_id: usize) -> usize {
        document_id >> self.shift
    }

    /// Zero the document's block if this query has not touched it yet.
    /// Returns true when a block was cleaned.
    #[inline]
    pub fn touch(&mut self, document_id: usize) -> bool {
        let block = self.block_of(document_id);
        if self.clean_flags[block] {
            return false;
        }
        self.clean_flags[block] = true;
        let start = block * self.width;
        self.scores[start..start + self.width].fill(T::zero());
        true
    }

    /// Add `delta` to a slot that has already been touched; returns the old score.
    #[inline]
    pub fn add(&mut self, document_id: usize, delta: T) -> T {
        debug_assert!(self.clean_flags[self.block_of(document_id)], "slot added to before touch");
        let slot = &mut self.scores[document_id];
        let old = *slot;
        *slot = old.accumulate(delta);
        old
    }

    /// Current-query score; zero for documents whose block is untouched.
    pub fn score(&self, document_id: usize) -> T {
        if self.clean_flags[self.block_of(document_id)] {
            self.scores[document_id]
        } else {
            T::zero()
        }
    }

    /// Raw slot values, stale blocks included. Only touched slots are meaningful.
    #[inline]
    pub(crate) fn slots(&self) -> &[T] {
        &self.scores
    }

    /// Mark every block stale, in O(blocks).
    pub fn rewind(&mut self) {
        self.clean_flags.fill(false);
    }

    pub fn is_clean(&self, block: usize) -> bool {
        self.clean_flags[block]
    }

    pub fn clean_blocks(&self) -> usize {
        self.clean_flags.iter().filter(|&&clean| clean).count()
    }

    pub fn shift(&self) -> u32 {
        self.shift
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn blocks(&self) -> usize {
        self.clean_flags.len()
    }

    /// Number of documents the array was sized for
    pub fn len(&self) -> usize {
        self.documents
    }

    pub fn is_empty(&self) -> bool {
        self.documents == 0
    }
}
