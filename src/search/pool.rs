use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use crossbeam::channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, warn};
use crate::core::config::ScorerConfig;
use crate::core::error::{Error, Result};
use crate::core::stats::PoolStats;
use crate::core::types::PrimaryKeys;
use crate::query::parser::{QueryParser, StandardQueryParser};
use crate::scoring::rsv::Rsv;
use crate::search::scorer::QueryScorer;

/// Pool of ready-built scorers for worker threads.
///
/// A checked-out scorer belongs to one thread until it is dropped, when it is
/// rewound and queued for the next checkout. Scorers share nothing but the
/// read-only key table.
pub struct ScorerPool<'k, T: Rsv = u16, P: QueryParser + Clone = StandardQueryParser> {
    idle_sender: Sender<QueryScorer<'k, T, P>>,
    idle_receiver: Receiver<QueryScorer<'k, T, P>>,
    primary_keys: &'k PrimaryKeys,
    config: ScorerConfig,
    parser: P,
    stats: Mutex<PoolStats>,
}

impl<'k, T: Rsv> ScorerPool<'k, T, StandardQueryParser> {
    pub fn new(primary_keys: &'k PrimaryKeys, config: ScorerConfig, max_idle: usize) -> Result<Self> {
        let parser = StandardQueryParser::new(config.max_term_length);
        ScorerPool::with_parser(primary_keys, config, parser, max_idle)
    }
}

impl<'k, T: Rsv, P: QueryParser + Clone> ScorerPool<'k, T, P> {
    /// Build `max_idle` scorers up front.
    pub fn with_parser(primary_keys: &'k PrimaryKeys, config: ScorerConfig, parser: P, max_idle: usize) -> Result<Self> {
        if max_idle == 0 {
            return Err(Error::invalid_argument("scorer pool needs room for at least one scorer"));
        }
        let (idle_sender, idle_receiver) = bounded(max_idle);
        for _ in 0..max_idle {
            let scorer = QueryScorer::with_parser(primary_keys, &config, parser.clone())?;
            if idle_sender.try_send(scorer).is_err() {
                break;
            }
        }
        debug!(max_idle, documents = config.collection_size, top_k = config.top_k, "scorer pool created");

        Ok(ScorerPool {
            idle_sender,
            idle_receiver,
            primary_keys,
            config,
            parser,
            stats: Mutex::new(PoolStats::default()),
        })
    }

    /// Take an idle scorer, building a new one if every scorer is in use.
    pub fn checkout(&self) -> Result<PooledScorer<'_, 'k, T, P>> {
        let scorer = match self.idle_receiver.try_recv() {
            Ok(scorer) => scorer,
            Err(_) => {
                warn!(max_idle = self.capacity(), "scorer pool exhausted, building another scorer");
                let scorer = QueryScorer::with_parser(self.primary_keys, &self.config, self.parser.clone())?;
                self.stats.lock().created += 1;
                scorer
            }
        };
        self.stats.lock().checkouts += 1;

        Ok(PooledScorer {
            scorer: ManuallyDrop::new(scorer),
            pool: self,
        })
    }

    fn give_back(&self, mut scorer: QueryScorer<'k, T, P>) {
        scorer.rewind();
        let queued = self.idle_sender.try_send(scorer).is_ok();
        let mut stats = self.stats.lock();
        if queued {
            stats.returned += 1;
        } else {
            stats.discarded += 1;
        }
    }

    /// Scorers waiting for a checkout
    pub fn idle(&self) -> usize {
        self.idle_receiver.len()
    }

    pub fn capacity(&self) -> usize {
        self.idle_sender.capacity().unwrap_or(0)
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    pub fn stats(&self) -> PoolStats {
        self.stats.lock().clone()
    }
}

/// A scorer on loan from a [`ScorerPool`]; rewound and returned on drop.
pub struct PooledScorer<'p, 'k, T: Rsv, P: QueryParser + Clone> {
    scorer: ManuallyDrop<QueryScorer<'k, T, P>>,
    pool: &'p ScorerPool<'k, T, P>,
}

impl<'p, 'k, T: Rsv, P: QueryParser + Clone> Deref for PooledScorer<'p, 'k, T, P> {
    type Target = QueryScorer<'k, T, P>;

    fn deref(&self) -> &Self::Target {
        &self.scorer
    }
}

impl<'p, 'k, T: Rsv, P: QueryParser + Clone> DerefMut for PooledScorer<'p, 'k, T, P> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.scorer
    }
}

impl<'p, 'k, T: Rsv, P: QueryParser + Clone> Drop for PooledScorer<'p, 'k, T, P> {
    fn drop(&mut self) {
        // SAFETY: taken exactly once, and never touched again
        let scorer = unsafe { ManuallyDrop::take(&mut self.scorer) };
        self.pool.give_back(scorer);
    }
}
