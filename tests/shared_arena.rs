//! Concurrent allocation from one fixed-size arena.

use std::sync::Barrier;
use rsvcore::SharedArena;

const THREADS: usize = 8;
const ALLOCATIONS_PER_THREAD: usize = 500;

fn request_size(thread: usize, i: usize) -> usize {
    1 + (thread * 31 + i * 7) % 24
}

/// Every thread allocates, stamps its bytes with its own id, and records the ranges.
fn allocate_concurrently(memory: &SharedArena) -> Vec<Vec<(usize, usize)>> {
    let barrier = Barrier::new(THREADS);

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|thread| {
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    let mut ranges = Vec::with_capacity(ALLOCATIONS_PER_THREAD);
                    for i in 0..ALLOCATIONS_PER_THREAD {
                        let bytes = memory.allocate(request_size(thread, i));
                        bytes.fill(thread as u8);
                        ranges.push((bytes.as_ptr() as usize, bytes.len()));
                    }
                    ranges
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
}

#[test]
fn test_concurrent_ranges_are_disjoint() {
    let expected: usize = (0..THREADS)
        .flat_map(|thread| (0..ALLOCATIONS_PER_THREAD).map(move |i| request_size(thread, i)))
        .sum();
    let mut memory = SharedArena::new(expected + 1024);

    for _ in 0..20 {
        let per_thread = allocate_concurrently(&memory);
        assert_eq!(memory.size(), expected);

        let mut ranges: Vec<(usize, usize)> = per_thread.iter().flatten().copied().collect();
        assert_eq!(ranges.len(), THREADS * ALLOCATIONS_PER_THREAD);
        ranges.sort_unstable();
        for pair in ranges.windows(2) {
            let (start, len) = pair[0];
            assert!(start + len <= pair[1].0, "overlapping allocations");
        }

        // No thread's bytes were overwritten by another
        for (thread, ranges) in per_thread.iter().enumerate() {
            for &(start, len) in ranges {
                // SAFETY: the range came from the arena, which is still alive and not rewound
                let bytes = unsafe { std::slice::from_raw_parts(start as *const u8, len) };
                assert!(bytes.iter().all(|&b| b == thread as u8));
            }
        }

        memory.rewind();
        assert_eq!(memory.size(), 0);
    }
}

#[test]
fn test_concurrent_aligned_allocations() {
    let memory = SharedArena::new(64 * 1024);

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for i in 0..100 {
                    let bytes = memory.allocate_aligned(1 + i % 13, 8);
                    assert_eq!(bytes.as_ptr() as usize % 8, 0);
                }
            });
        }
    });
    assert!(memory.size() <= memory.capacity());
}
