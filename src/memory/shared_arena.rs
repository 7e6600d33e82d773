use std::alloc::{self, Layout};
use std::ptr::NonNull;
use std::slice;
use std::sync::atomic::{AtomicUsize, Ordering};
use crate::core::stats::MemoryStats;
use crate::memory::arena::{align_offset, alloc_backing, out_of_memory};

/// Fixed-capacity bump allocator that several threads may allocate from at once.
///
/// The cursor is advanced with a compare-and-swap loop, so no lock is taken.
/// There is no growth: running out of space is fatal.
pub struct SharedArena {
    buffer: NonNull<u8>,
    layout: Layout,
    capacity: usize,
    used: AtomicUsize,
}

// SAFETY: the buffer is owned by the arena and every byte range is handed out
// to exactly one caller; the cursor is only moved atomically.
unsafe impl Send for SharedArena {}
unsafe impl Sync for SharedArena {}

impl SharedArena {
    pub fn new(capacity: usize) -> Self {
        let (buffer, layout) = alloc_backing(capacity, capacity, 0, 0);
        SharedArena {
            buffer,
            layout,
            capacity,
            used: AtomicUsize::new(0),
        }
    }

    #[allow(clippy::mut_from_ref)]
    pub fn allocate(&self, bytes: usize) -> &mut [u8] {
        self.allocate_aligned(bytes, 1)
    }

    /// Reserve `bytes` starting at a multiple of `alignment` (a power of two).
    #[allow(clippy::mut_from_ref)]
    pub fn allocate_aligned(&self, bytes: usize, alignment: usize) -> &mut [u8] {
        debug_assert!(alignment.is_power_of_two(), "alignment must be a power of two");
        let base = self.buffer.as_ptr() as usize;
        let mut already_used = self.used.load(Ordering::Acquire);

        loop {
            let start = align_offset(base, already_used, alignment);
            let new_used = match start.checked_add(bytes) {
                Some(end) if end <= self.capacity => end,
                _ => self.exhausted(bytes, already_used),
            };

            match self.used.compare_exchange_weak(already_used, new_used, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => {
                    // SAFETY: [start, new_used) is inside the buffer and now owned
                    // by this caller alone; rewind needs &mut self.
                    return unsafe { slice::from_raw_parts_mut(self.buffer.as_ptr().add(start), bytes) };
                }
                Err(actual) => already_used = actual,
            }
        }
    }

    fn exhausted(&self, bytes: usize, used: usize) -> ! {
        let layout = Layout::from_size_align(bytes.max(1), 1).unwrap_or(Layout::new::<u8>());
        out_of_memory(layout, bytes, used, self.capacity)
    }

    pub fn rewind(&mut self) {
        *self.used.get_mut() = 0;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes consumed, alignment padding included
    pub fn size(&self) -> usize {
        self.used.load(Ordering::Acquire)
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.size()
    }

    pub fn stats(&self) -> MemoryStats {
        MemoryStats::new(self.size(), self.capacity, 1)
    }
}

impl Drop for SharedArena {
    fn drop(&mut self) {
        // SAFETY: buffer came from alloc_zeroed with this layout
        unsafe { alloc::dealloc(self.buffer.as_ptr(), self.layout) }
    }
}
