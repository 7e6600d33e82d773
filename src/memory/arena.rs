use std::alloc::{self, Layout};
use std::cell::{Cell, RefCell};
use std::ptr::{self, NonNull};
use std::slice;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error};
use crate::core::stats::MemoryStats;

/// Machine word size; `realign` pads the cursor to a multiple of this.
pub const WORD_SIZE: usize = std::mem::size_of::<usize>();

/// Default size of each backing block
pub const DEFAULT_BLOCK_SIZE: usize = 1024 * 1024;

/// Unaligned reads fault on 32-bit ARM, so every allocation is word-aligned there.
pub(crate) const DEFAULT_ALIGNMENT: usize = if cfg!(target_arch = "arm") { WORD_SIZE } else { 1 };

/// Generations are globally unique so a handle never resolves against
/// another arena, or against a later query in the same arena.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Zeroed, word-aligned backing memory. Never returns on failure.
pub(crate) fn alloc_backing(size: usize, requested: usize, used: usize, allocated: usize) -> (NonNull<u8>, Layout) {
    let layout = match Layout::from_size_align(size.max(1), WORD_SIZE) {
        Ok(layout) => layout,
        Err(_) => out_of_memory(Layout::new::<usize>(), requested, used, allocated),
    };
    // SAFETY: layout size is non-zero
    let ptr = unsafe { alloc::alloc_zeroed(layout) };
    match NonNull::new(ptr) {
        Some(ptr) => (ptr, layout),
        None => out_of_memory(layout, requested, used, allocated),
    }
}

/// Log the totals and terminate; a query cannot continue without memory.
pub(crate) fn out_of_memory(layout: Layout, requested: usize, used: usize, allocated: usize) -> ! {
    error!(requested, used, allocated, "out of memory: {} bytes requested {} bytes used {} bytes allocated",
        requested, used, allocated);
    alloc::handle_alloc_error(layout)
}

/// Offset from `base` of the first address at or after `base + cursor` that is a multiple of `align`.
#[inline]
pub(crate) fn align_offset(base: usize, cursor: usize, align: usize) -> usize {
    let addr = base + cursor;
    ((addr + align - 1) & !(align - 1)) - base
}

struct Chunk {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl Chunk {
    fn size(&self) -> usize {
        self.layout.size()
    }

    fn base(&self) -> usize {
        self.ptr.as_ptr() as usize
    }
}

impl Drop for Chunk {
    fn drop(&mut self) {
        // SAFETY: ptr came from alloc_zeroed with this layout
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

/// Location of bytes stored with [`Arena::store`], valid until the next rewind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaRef {
    generation: u64,
    chunk: usize,
    offset: usize,
    len: usize,
}

impl ArenaRef {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Bump allocator over a chain of large backing blocks.
///
/// Allocations cannot be freed individually; `rewind` discards all of them
/// at once (no destructors run) and keeps the backing blocks for reuse.
/// `rewind` takes `&mut self`, so nothing handed out can outlive it.
///
/// Allocations are byte-packed by default. Call `realign` (or
/// `allocate_aligned`) before alignment-sensitive data.
pub struct Arena {
    chunks: RefCell<Vec<Chunk>>,
    current: Cell<usize>,     // Chunk accepting allocations
    cursor: Cell<usize>,      // Next free byte within the current chunk
    used: Cell<usize>,
    allocated: Cell<usize>,
    block_size: usize,
    generation: u64,
}

// SAFETY: the arena exclusively owns its chunks. Cell/RefCell keep it !Sync.
unsafe impl Send for Arena {}

impl Default for Arena {
    fn default() -> Self {
        Arena::new()
    }
}

impl Arena {
    pub fn new() -> Self {
        Arena::with_block_size(DEFAULT_BLOCK_SIZE)
    }

    pub fn with_block_size(block_size: usize) -> Self {
        Arena {
            chunks: RefCell::new(Vec::new()),
            current: Cell::new(0),
            cursor: Cell::new(0),
            used: Cell::new(0),
            allocated: Cell::new(0),
            block_size: block_size.max(1),
            generation: next_generation(),
        }
    }

    /// Reserve `bytes` at `align`, walking to the next retained chunk or
    /// growing the chain when the current chunk is full.
    fn bump(&self, bytes: usize, align: usize) -> (usize, usize, NonNull<u8>) {
        debug_assert!(align.is_power_of_two(), "alignment must be a power of two");
        let mut chunks = self.chunks.borrow_mut();

        loop {
            let index = self.current.get();
            if let Some(chunk) = chunks.get(index) {
                let cursor = self.cursor.get();
                let start = align_offset(chunk.base(), cursor, align);
                if let Some(end) = start.checked_add(bytes).filter(|&end| end <= chunk.size()) {
                    self.cursor.set(end);
                    self.used.set(self.used.get() + (end - cursor));
                    // SAFETY: start + bytes <= chunk size
                    let ptr = unsafe { chunk.ptr.add(start) };
                    return (index, start, ptr);
                }
                if index + 1 < chunks.len() {
                    self.current.set(index + 1);
                    self.cursor.set(0);
                    continue;
                }
            }

            let size = self.block_size.max(bytes.saturating_add(align - 1));
            let (ptr, layout) = alloc_backing(size, bytes, self.used.get(), self.allocated.get());
            chunks.push(Chunk { ptr, layout });
            self.allocated.set(self.allocated.get() + layout.size());
            self.current.set(chunks.len() - 1);
            self.cursor.set(0);
            debug!(chunks = chunks.len(), size = layout.size(), "arena grew");
        }
    }

    /// Hand out `bytes` bytes. The contents are whatever the block last held.
    #[allow(clippy::mut_from_ref)]
    pub fn allocate(&self, bytes: usize) -> &mut [u8] {
        self.allocate_aligned(bytes, DEFAULT_ALIGNMENT)
    }

    #[allow(clippy::mut_from_ref)]
    pub fn allocate_aligned(&self, bytes: usize, alignment: usize) -> &mut [u8] {
        let (_, _, ptr) = self.bump(bytes, alignment.max(DEFAULT_ALIGNMENT));
        // SAFETY: each range is handed out once per generation and chunk
        // memory is initialised. Rewinding needs &mut self, which ends every
        // borrow taken from this method.
        unsafe { slice::from_raw_parts_mut(ptr.as_ptr(), bytes) }
    }

    pub fn alloc_bytes(&self, bytes: &[u8]) -> &[u8] {
        let dst = self.allocate(bytes.len());
        dst.copy_from_slice(bytes);
        dst
    }

    pub fn alloc_str(&self, text: &str) -> &str {
        let bytes = self.alloc_bytes(text.as_bytes());
        // SAFETY: byte-for-byte copy of a str
        unsafe { std::str::from_utf8_unchecked(bytes) }
    }

    /// Copy `bytes` in and return a handle instead of a borrow, for owners
    /// that keep the handle next to the arena itself.
    pub fn store(&self, bytes: &[u8]) -> ArenaRef {
        let (chunk, offset, ptr) = self.bump(bytes.len(), DEFAULT_ALIGNMENT);
        // SAFETY: the destination range was just reserved and cannot overlap `bytes`
        unsafe { ptr::copy_nonoverlapping(bytes.as_ptr(), ptr.as_ptr(), bytes.len()) };
        ArenaRef {
            generation: self.generation,
            chunk,
            offset,
            len: bytes.len(),
        }
    }

    /// Resolve a handle; `None` once the arena has been rewound since it was stored.
    pub fn get(&self, handle: &ArenaRef) -> Option<&[u8]> {
        if handle.generation != self.generation {
            return None;
        }
        let chunks = self.chunks.borrow();
        let chunk = chunks.get(handle.chunk)?;
        if handle.offset + handle.len > chunk.size() {
            return None;
        }
        // SAFETY: in bounds, and stored ranges are never handed out mutably
        let ptr = unsafe { chunk.ptr.as_ptr().add(handle.offset) };
        Some(unsafe { slice::from_raw_parts(ptr, handle.len) })
    }

    /// Pad the cursor so the next allocation starts on a machine-word boundary.
    pub fn realign(&self) {
        let chunks = self.chunks.borrow();
        if let Some(chunk) = chunks.get(self.current.get()) {
            let cursor = self.cursor.get();
            let aligned = align_offset(chunk.base(), cursor, WORD_SIZE).min(chunk.size());
            self.cursor.set(aligned);
            self.used.set(self.used.get() + (aligned - cursor));
        }
    }

    /// Discard every allocation. Backing blocks are kept.
    pub fn rewind(&mut self) {
        self.current.set(0);
        self.cursor.set(0);
        self.used.set(0);
        self.generation = next_generation();
    }

    /// Bytes of backing memory owned
    pub fn capacity(&self) -> usize {
        self.allocated.get()
    }

    /// Bytes consumed since the last rewind, alignment padding included
    pub fn size(&self) -> usize {
        self.used.get()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.borrow().len()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn stats(&self) -> MemoryStats {
        MemoryStats::new(self.size(), self.capacity(), self.chunk_count())
    }
}
