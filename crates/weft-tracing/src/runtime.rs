use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::buffer::{self, EventBuffer};
use crate::dispatch::{self, SharedEventBuffer};
use crate::errors::Result;
use crate::serializer;
use crate::standard_events;

pub(crate) struct ThreadEntry {
    pub thread_id: u32,
    pub name: String,
    pub buffer: Arc<SharedEventBuffer>,
}

lazy_static::lazy_static! {
    static ref RUNTIME: Runtime = Runtime::new();
}

/// Process-wide tracing runtime: the table of registered thread buffers and
/// the serialization entry points.
///
/// Serialization assumes quiescence: while [`Runtime::save_to_file`] or
/// [`Runtime::write_trace`] runs, no enabled thread may be emitting. Callers
/// typically serialize after joining worker threads or from a point where
/// instrumented code is known idle.
pub struct Runtime {
    threads: Mutex<Vec<ThreadEntry>>,
}

impl Runtime {
    fn new() -> Self {
        standard_events::register_all();
        Self {
            threads: Mutex::new(Vec::new()),
        }
    }

    pub fn global() -> &'static Self {
        &RUNTIME
    }

    /// Enables tracing on the current thread under `name`, creating and
    /// binding its buffer. The buffer immediately receives the thread's zone
    /// metadata, so an enabled thread is never empty. Enabling an already
    /// enabled thread is a no-op.
    pub fn enable_current_thread(&self, name: &str) {
        self.enable_current_thread_with_capacity(name, default_thread_buffer_capacity());
    }

    /// Same as [`Self::enable_current_thread`] with an explicit soft cap, in
    /// 32-bit entries.
    pub fn enable_current_thread_with_capacity(&self, name: &str, capacity: usize) {
        if dispatch::is_thread_bound() {
            return;
        }
        let shared = Arc::new(SharedEventBuffer::new(EventBuffer::with_capacity(capacity)));
        {
            let mut threads = self.threads.lock().unwrap();
            let thread_id = threads.len() as u32 + 1;
            threads.push(ThreadEntry {
                thread_id,
                name: name.to_owned(),
                buffer: Arc::clone(&shared),
            });
        }
        dispatch::bind_thread_buffer(Arc::clone(&shared));
        // Safety: bound to this thread a line ago; we are the sole writer.
        let buffer = unsafe { shared.get() };
        let zone_id = standard_events::create_zone(buffer, name, "thread", "");
        standard_events::set_zone(buffer, zone_id);
    }

    /// Unbinds the current thread's buffer. The buffer stays registered and
    /// will still be serialized.
    pub fn disable_current_thread(&self) {
        dispatch::unbind_thread_buffer();
    }

    /// Serializes the registry and every registered thread buffer into
    /// `writer`.
    pub fn write_trace<W: Write>(&self, writer: &mut W) -> Result<()> {
        serializer::write_trace(self, writer)
    }

    /// Writes the trace to `path`, truncating any existing file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_trace(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Drops every thread registration and restarts zone numbering. The
    /// definition registry is intentionally left alone: call sites cache
    /// their wire ids and cannot re-register.
    ///
    /// Callers must disable every thread they enabled first.
    pub fn reset_for_testing(&self) {
        self.threads.lock().unwrap().clear();
        standard_events::reset_zone_ids();
    }

    pub(crate) fn lock_threads(&self) -> MutexGuard<'_, Vec<ThreadEntry>> {
        self.threads.lock().unwrap()
    }
}

fn default_thread_buffer_capacity() -> usize {
    std::env::var("WEFT_THREAD_BUFFER_CAPACITY")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(buffer::DEFAULT_CAPACITY)
}
