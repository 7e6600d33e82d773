use std::cmp::Ordering;
use tracing::{debug, trace};
use crate::core::config::ScorerConfig;
use crate::core::error::{Error, Result};
use crate::core::stats::QueryStats;
use crate::core::types::PrimaryKeys;
use crate::memory::arena::{Arena, DEFAULT_BLOCK_SIZE};
use crate::query::parser::{QueryParser, StandardQueryParser};
use crate::query::terms::{TermList, Terms};
use crate::scoring::accumulator::Accumulators;
use crate::scoring::rsv::Rsv;
use crate::search::heap::{rank, TopKHeap};
use crate::search::results::Results;

/// Per-query scoring state: accumulators, the top-k heap, and the arena
/// holding the parsed query.
///
/// Everything is sized once at construction and reused; `rewind` must be
/// called between queries. One scorer serves one query at a time, so
/// concurrent queries each use their own scorer (see `ScorerPool`).
pub struct QueryScorer<'k, T: Rsv = u16, P: QueryParser = StandardQueryParser> {
    arena: Arena,
    terms: TermList,
    parser: P,
    accumulators: Accumulators<T>,
    heap: TopKHeap,
    primary_keys: &'k PrimaryKeys,
    sorted: bool,    // Heap buffer is in result order, not heap order
    stats: QueryStats,
}

impl<'k, T: Rsv> QueryScorer<'k, T, StandardQueryParser> {
    /// Panics if `primary_keys` has fewer than `documents` entries.
    pub fn new(primary_keys: &'k PrimaryKeys, documents: usize, top_k: usize) -> Self {
        QueryScorer::build(primary_keys, documents, top_k, DEFAULT_BLOCK_SIZE, StandardQueryParser::default())
    }

    pub fn with_config(primary_keys: &'k PrimaryKeys, config: &ScorerConfig) -> Result<Self> {
        QueryScorer::with_parser(primary_keys, config, StandardQueryParser::new(config.max_term_length))
    }
}

impl<'k, T: Rsv, P: QueryParser> QueryScorer<'k, T, P> {
    pub fn with_parser(primary_keys: &'k PrimaryKeys, config: &ScorerConfig, parser: P) -> Result<Self> {
        config.validate()?;
        if primary_keys.len() < config.collection_size {
            return Err(Error::invalid_argument(format!(
                "{} primary keys for a collection of {} documents",
                primary_keys.len(), config.collection_size
            )));
        }
        Ok(QueryScorer::build(
            primary_keys,
            config.collection_size,
            config.top_k,
            config.arena_block_size,
            parser,
        ))
    }

    fn build(primary_keys: &'k PrimaryKeys, documents: usize, top_k: usize, block_size: usize, parser: P) -> Self {
        assert!(
            primary_keys.len() >= documents,
            "{} primary keys for a collection of {} documents", primary_keys.len(), documents
        );
        let accumulators = Accumulators::new(documents);
        debug!(
            documents,
            top_k,
            shift = accumulators.shift(),
            blocks = accumulators.blocks(),
            "query scorer created"
        );

        let mut scorer = QueryScorer {
            arena: Arena::with_block_size(block_size),
            terms: TermList::new(),
            parser,
            accumulators,
            heap: TopKHeap::new(top_k),
            primary_keys,
            sorted: false,
            stats: QueryStats::default(),
        };
        scorer.rewind();
        scorer
    }

    /// Parse query text into this query's term list. Terms accumulate until
    /// the next `rewind`.
    pub fn parse(&mut self, query: &str) -> Result<()> {
        self.parser.parse(&self.arena, &mut self.terms, query)
    }

    pub fn terms(&self) -> Terms<'_> {
        Terms::new(&self.terms, &self.arena)
    }

    /// Add `delta` to a document's score and keep the top-k current.
    ///
    /// `document_id` must be below the collection size and `delta` must not
    /// be negative; both are checked in debug builds only. Zero deltas are
    /// ignored.
    #[inline]
    pub fn add_rsv(&mut self, document_id: usize, delta: T) {
        debug_assert!(
            document_id < self.accumulators.len(),
            "document {} outside a collection of {}", document_id, self.accumulators.len()
        );
        debug_assert!(delta >= T::zero(), "negative rsv contribution {:?}", delta);
        if delta.is_zero() {
            return;
        }

        if self.accumulators.touch(document_id) {
            self.stats.blocks_cleaned += 1;
        }
        self.stats.contributions += 1;

        if !self.heap.is_full() {
            // Any change while filling can invalidate an earlier sort
            self.sorted = false;
            let old = self.accumulators.add(document_id, delta);
            if old.is_zero() {
                self.heap.push(document_id);
                if self.heap.is_full() {
                    self.heap.build_min_heap(self.accumulators.slots());
                }
            }
            return;
        }

        if self.sorted {
            self.heap.build_min_heap(self.accumulators.slots());
            self.sorted = false;
        }
        let Some(root) = self.heap.root() else {
            // k == 0: accumulate only
            self.accumulators.add(document_id, delta);
            return;
        };

        // Scores only grow and the root only moves up, so anything ranked at
        // or above the root before this update is already a member.
        let member = rank(self.accumulators.slots(), document_id, root) != Ordering::Less;
        self.accumulators.add(document_id, delta);

        if member {
            let found = self.heap.min_update(self.accumulators.slots(), document_id);
            debug_assert!(found, "heap member not found");
            self.stats.heap_updates += 1;
        } else if rank(self.accumulators.slots(), document_id, root) == Ordering::Greater {
            self.heap.min_insert(self.accumulators.slots(), document_id);
            self.stats.heap_insertions += 1;
        }
    }

    /// Reset for the next query. Costs O(blocks + k), not O(documents).
    pub fn rewind(&mut self) {
        self.heap.clear();
        self.accumulators.rewind();
        self.terms.clear();
        self.arena.rewind();
        self.sorted = false;
        self.stats = QueryStats::default();
        trace!("query scorer rewound");
    }

    /// Put the tracked documents in result order: descending score, then
    /// ascending document id.
    pub fn sort(&mut self) {
        if !self.sorted {
            self.heap.sort_descending(self.accumulators.slots());
            self.sorted = true;
        }
    }

    pub fn results(&mut self) -> Results<'_, 'k, T> {
        self.sort();
        Results::new(self.heap.as_slice(), self.accumulators.slots(), self.primary_keys)
    }

    /// Documents currently tracked (at most k)
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn top_k(&self) -> usize {
        self.heap.k()
    }

    pub fn collection_size(&self) -> usize {
        self.accumulators.len()
    }

    /// Current-query score of any document, tracked or not
    pub fn score(&self, document_id: usize) -> T {
        self.accumulators.score(document_id)
    }

    pub fn accumulators(&self) -> &Accumulators<T> {
        &self.accumulators
    }

    /// Scratch memory for the current query; emptied by `rewind`.
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn stats(&self) -> QueryStats {
        QueryStats {
            tracked: self.heap.len(),
            memory: self.arena.stats(),
            ..self.stats.clone()
        }
    }
}
