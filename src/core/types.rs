use serde::{Serialize, Deserialize};

/// Dense, 0-based document identifier; also the accumulator slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocId(pub usize);

impl DocId {
    pub fn new(id: usize) -> Self {
        DocId(id)
    }

    pub fn value(&self) -> usize {
        self.0
    }
}

impl From<usize> for DocId {
    fn from(id: usize) -> Self {
        DocId(id)
    }
}

/// External identifiers indexed by document id. Owned by the caller and
/// borrowed read-only for the lifetime of a scorer.
pub type PrimaryKeys = [String];
