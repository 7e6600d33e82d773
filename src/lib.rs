pub mod core;
pub mod memory;
pub mod scoring;
pub mod search;
pub mod query;

pub use crate::core::config::ScorerConfig;
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::types::DocId;
pub use crate::memory::arena::Arena;
pub use crate::memory::shared_arena::SharedArena;
pub use crate::scoring::rsv::Rsv;
pub use crate::search::pool::ScorerPool;
pub use crate::search::results::RankedDocument;
pub use crate::search::scorer::QueryScorer;

/*
┌──────────────────────────────────────────────────────────────────────────────────┐
│                              RSVCORE STRUCT ARCHITECTURE                          │
└──────────────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────────────── SEARCH LAYER ───────────────────────────────┐
│                                                                                   │
│  ┌─────────────────────────────────────────────────────────────────────────┐     │
│  │                    struct QueryScorer<'k, T: Rsv, P>                      │     │
│  │  arena: Arena                     // Query-lifetime scratch memory        │     │
│  │  terms: TermList                  // Parsed terms (handles into arena)   │     │
│  │  parser: P: QueryParser           // Text → terms                         │     │
│  │  accumulators: Accumulators<T>    // One slot per document               │     │
│  │  heap: TopKHeap                   // Slot indices of the current top-k   │     │
│  │  primary_keys: &'k [String]       // Caller-owned, read-only              │     │
│  └─────────────────────────────────────────────────────────────────────────┘     │
│                                                                                   │
│  ┌────────────────────────┐  ┌─────────────────────────┐  ┌──────────────────┐   │
│  │ struct ScorerPool      │  │ struct RankedDocument   │  │ struct TopKHeap  │   │
│  │ • idle: channel of     │  │ • document_id: DocId    │  │ • slots: Vec     │   │
│  │   QueryScorer          │  │ • primary_key: &str     │  │ • k: usize       │   │
│  │ • stats: PoolStats     │  │ • rsv: T                │  └──────────────────┘   │
│  └────────────────────────┘  └─────────────────────────┘                         │
└───────────────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────────────── SCORING LAYER ──────────────────────────────┐
│                                                                                   │
│  ┌──────────────────────────────────────┐  ┌──────────────────────────────────┐  │
│  │ struct Accumulators<T>               │  │ trait Rsv                        │  │
│  │ • scores: Vec<T>  (blocks × width)   │  │ • zero / is_zero                 │  │
│  │ • clean_flags: Vec<bool> (per block) │  │ • total_cmp                      │  │
│  │ • shift = log2(sqrt(documents))      │  │ impl: u8..u64, i32, i64, f32, f64│  │
│  └──────────────────────────────────────┘  └──────────────────────────────────┘  │
└───────────────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────────────── MEMORY LAYER ───────────────────────────────┐
│                                                                                   │
│  ┌──────────────────────────────────────┐  ┌──────────────────────────────────┐  │
│  │ struct Arena (single owner)          │  │ struct SharedArena (Sync)        │  │
│  │ • chunks: chained backing blocks     │  │ • buffer: one fixed block        │  │
│  │ • cursor / used / allocated          │  │ • used: AtomicUsize (CAS loop)   │  │
│  │ • generation (expires ArenaRef)      │  │ • no growth, overflow is fatal   │  │
│  └──────────────────────────────────────┘  └──────────────────────────────────┘  │
└───────────────────────────────────────────────────────────────────────────────────┘

add_rsv(doc, delta)
    ├─ block of doc dirty? → zero block, mark clean
    ├─ heap filling  → first contribution appends slot; heapify when k reached
    └─ heap full     → member: sift down │ beats root: evict root │ else: nothing
*/
