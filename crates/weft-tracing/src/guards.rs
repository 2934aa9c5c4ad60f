use std::cell::Cell;
use std::marker::PhantomData;

use crate::buffer::EventBuffer;
use crate::dispatch;
use crate::event::args::EventArgs;
use crate::event::ScopedEventIf;
use crate::runtime::Runtime;

/// Stack-allocated pairing of a scoped event's enter and leave.
///
/// Construction is split from `enter` so a declaration macro can separate the
/// guard from its argument pack. `enter` captures the thread's buffer at that
/// moment; dropping the guard emits the leave record against the captured
/// buffer, or nothing if the thread was not enabled when the scope opened.
pub struct ScopeGuardIf<'a, const ENABLED: bool, Args: EventArgs> {
    event: &'a ScopedEventIf<ENABLED, Args>,
    // Raw pointer doubles as the !Send/!Sync marker; a guard must not leave
    // the thread whose buffer it captured.
    buffer: Cell<*mut EventBuffer>,
}

impl<'a, const ENABLED: bool, Args: EventArgs> ScopeGuardIf<'a, ENABLED, Args> {
    pub fn new(event: &'a ScopedEventIf<ENABLED, Args>) -> Self {
        Self {
            event,
            buffer: Cell::new(std::ptr::null_mut()),
        }
    }

    pub fn enter(&self, args: Args::Values<'_>) {
        if !ENABLED {
            return;
        }
        let buffer = dispatch::thread_buffer_ptr();
        if !buffer.is_null() {
            self.buffer.set(buffer);
            // Safety: the pointer is this thread's bound buffer, which stays
            // registered with the runtime for at least as long as the thread
            // keeps emitting.
            self.event.enter_specific(unsafe { &mut *buffer }, args);
        }
    }
}

impl<const ENABLED: bool, Args: EventArgs> Drop for ScopeGuardIf<'_, ENABLED, Args> {
    fn drop(&mut self) {
        if !ENABLED {
            return;
        }
        let buffer = self.buffer.get();
        if !buffer.is_null() {
            // Safety: same buffer `enter` captured, on the same thread.
            self.event.leave_specific(unsafe { &mut *buffer });
        }
    }
}

/// Enables tracing for the current thread on construction and disables it on
/// drop.
pub struct ThreadGuard {
    _not_send: PhantomData<*mut u8>,
}

impl ThreadGuard {
    pub fn new(name: &str) -> Self {
        Runtime::global().enable_current_thread(name);
        Self {
            _not_send: PhantomData,
        }
    }
}

impl Drop for ThreadGuard {
    fn drop(&mut self) {
        Runtime::global().disable_current_thread();
    }
}
