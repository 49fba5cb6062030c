//! Allocator Configuration
//!
//! With `memory_tracking` enabled every allocation is counted so the BEAM
//! side can observe how much the reader trees hold. Without it the stats
//! read as zero.

#[cfg(feature = "memory_tracking")]
mod tracking {
    use std::alloc::{GlobalAlloc, Layout};
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub static ALLOCATED: AtomicUsize = AtomicUsize::new(0);
    pub static PEAK_ALLOCATED: AtomicUsize = AtomicUsize::new(0);

    pub struct TrackingAllocator;

    #[cfg(feature = "mimalloc")]
    static UNDERLYING: mimalloc::MiMalloc = mimalloc::MiMalloc;

    #[cfg(not(feature = "mimalloc"))]
    static UNDERLYING: std::alloc::System = std::alloc::System;

    /// Raise the recorded peak to at least `current`
    fn raise_peak(current: usize) {
        let mut peak = PEAK_ALLOCATED.load(Ordering::Relaxed);
        while current > peak {
            match PEAK_ALLOCATED.compare_exchange_weak(peak, current, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(_) => break,
                Err(p) => peak = p,
            }
        }
    }

    unsafe impl GlobalAlloc for TrackingAllocator {
        unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
            let ptr = UNDERLYING.alloc(layout);
            if !ptr.is_null() {
                raise_peak(ALLOCATED.fetch_add(layout.size(), Ordering::Relaxed) + layout.size());
            }
            ptr
        }

        unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
            ALLOCATED.fetch_sub(layout.size(), Ordering::Relaxed);
            UNDERLYING.dealloc(ptr, layout)
        }
    }
}

#[cfg(feature = "memory_tracking")]
#[global_allocator]
static GLOBAL: tracking::TrackingAllocator = tracking::TrackingAllocator;

#[cfg(all(feature = "mimalloc", not(feature = "memory_tracking")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Bytes currently allocated
#[cfg(feature = "memory_tracking")]
pub fn current() -> usize {
    tracking::ALLOCATED.load(std::sync::atomic::Ordering::SeqCst)
}

/// Highest allocation level since the last reset
#[cfg(feature = "memory_tracking")]
pub fn peak() -> usize {
    tracking::PEAK_ALLOCATED.load(std::sync::atomic::Ordering::SeqCst)
}

/// Restart peak tracking from the current level, returning
/// `(current, previous_peak)`
#[cfg(feature = "memory_tracking")]
pub fn reset() -> (usize, usize) {
    let current = current();
    let peak = tracking::PEAK_ALLOCATED.swap(current, std::sync::atomic::Ordering::SeqCst);
    (current, peak)
}

#[cfg(not(feature = "memory_tracking"))]
pub fn current() -> usize {
    0
}

#[cfg(not(feature = "memory_tracking"))]
pub fn peak() -> usize {
    0
}

#[cfg(not(feature = "memory_tracking"))]
pub fn reset() -> (usize, usize) {
    (0, 0)
}
