//! Thread-local buffer binding.
//!
//! Each enabled thread holds a slot pointing at its [`EventBuffer`]. The
//! buffer is shared with the runtime's registration table so it survives the
//! thread for post-mortem serialization, but it has exactly one writer: the
//! thread the slot belongs to. The runtime only reads it, and only while
//! every writer is quiescent.

use std::cell::{RefCell, UnsafeCell};
use std::sync::Arc;

use crate::buffer::EventBuffer;

/// Shares an [`EventBuffer`] between its owning thread and the runtime.
pub(crate) struct SharedEventBuffer {
    inner: UnsafeCell<EventBuffer>,
}

// One writer (the owning thread); other threads read only under the runtime's
// quiescence protocol.
unsafe impl Send for SharedEventBuffer {}
unsafe impl Sync for SharedEventBuffer {}

impl SharedEventBuffer {
    pub fn new(buffer: EventBuffer) -> Self {
        Self {
            inner: UnsafeCell::new(buffer),
        }
    }

    /// # Safety
    ///
    /// The caller must be the owning thread, or must hold the runtime's
    /// registration lock while the owner is known quiescent.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn get(&self) -> &mut EventBuffer {
        &mut *self.inner.get()
    }
}

thread_local! {
    static CURRENT_BUFFER: RefCell<Option<Arc<SharedEventBuffer>>> = RefCell::new(None);
}

pub(crate) fn bind_thread_buffer(buffer: Arc<SharedEventBuffer>) {
    CURRENT_BUFFER.with(|slot| {
        *slot.borrow_mut() = Some(buffer);
    });
}

pub(crate) fn unbind_thread_buffer() {
    CURRENT_BUFFER.with(|slot| {
        slot.borrow_mut().take();
    });
}

pub(crate) fn is_thread_bound() -> bool {
    CURRENT_BUFFER.with(|slot| {
        slot.try_borrow()
            .map_or(false, |binding| binding.is_some())
    })
}

/// Raw pointer to the bound buffer, or null. Scope guards capture this at
/// enter time so leave targets the same buffer even if the slot changes.
pub(crate) fn thread_buffer_ptr() -> *mut EventBuffer {
    CURRENT_BUFFER.with(|slot| match slot.try_borrow() {
        Ok(binding) => match binding.as_ref() {
            Some(shared) => shared.inner.get(),
            None => std::ptr::null_mut(),
        },
        Err(_) => std::ptr::null_mut(),
    })
}

/// Runs `f` against the current thread's buffer, or returns `None` when the
/// thread is not enabled. Reentrant calls (an emission made from inside `f`)
/// are dropped rather than handed an aliased buffer.
pub fn with_thread_buffer<R>(f: impl FnOnce(&mut EventBuffer) -> R) -> Option<R> {
    CURRENT_BUFFER.with(|slot| {
        let slot = slot.try_borrow_mut().ok()?;
        let shared = slot.as_ref()?;
        // Safety: this thread owns the binding, and the exclusive RefCell
        // borrow above keeps reentrant callers out for the span of `f`.
        Some(f(unsafe { shared.get() }))
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use std::thread;

    #[test]
    fn test_unbound_thread_has_no_buffer() {
        thread::spawn(|| {
            assert!(!is_thread_bound());
            assert!(thread_buffer_ptr().is_null());
            assert!(with_thread_buffer(|_| ()).is_none());
        })
        .join()
        .unwrap();
    }

    #[test]
    fn test_bind_and_unbind() {
        thread::spawn(|| {
            let shared = Arc::new(SharedEventBuffer::new(EventBuffer::new()));
            bind_thread_buffer(Arc::clone(&shared));
            assert!(is_thread_bound());
            with_thread_buffer(|buffer| buffer.add_entry(7));
            let recorded = with_thread_buffer(|buffer| buffer.entries().collect::<Vec<u32>>());
            assert_eq!(recorded, Some(vec![7]));
            unbind_thread_buffer();
            assert!(!is_thread_bound());
        })
        .join()
        .unwrap();
    }

    #[test]
    fn test_bindings_are_per_thread() {
        thread::spawn(|| {
            let shared = Arc::new(SharedEventBuffer::new(EventBuffer::new()));
            bind_thread_buffer(shared);
            thread::spawn(|| assert!(!is_thread_bound())).join().unwrap();
            unbind_thread_buffer();
        })
        .join()
        .unwrap();
    }
}
