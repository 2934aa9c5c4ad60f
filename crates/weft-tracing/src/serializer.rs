//! Encodes the registry and the registered thread buffers into one trace
//! stream.

use std::io::Write;

use crate::buffer::EventBuffer;
use crate::errors::Result;
use crate::event::{flags, EventRegistry};
use crate::runtime::Runtime;
use crate::standard_events;

use weft_tracing_wire as wire;

pub(crate) fn write_trace<W: Write>(runtime: &Runtime, writer: &mut W) -> Result<()> {
    // The scope-leave definition must be present even if every record that
    // references it was emitted through the direct shortcut.
    standard_events::register_all();

    wire::write_header(writer)?;

    // The definition section is itself a stream of define-event records,
    // built in a scratch buffer with its own string table.
    let mut definitions = EventRegistry::global().snapshot();
    definitions.sort_by_key(|definition| definition.flags() & flags::BUILTIN == 0);

    let mut scratch = EventBuffer::new();
    let mut name = String::new();
    let mut args = String::new();
    for definition in &definitions {
        name.clear();
        args.clear();
        definition.append_name(&mut name);
        definition.append_arguments(&mut args);
        standard_events::define_event(
            &mut scratch,
            definition.wire_id() as u16,
            definition.event_class() as u16,
            definition.flags(),
            &name,
            &args,
        );
    }
    if scratch.overflowed() {
        log::warn!("event definition section overflowed; trace will be incomplete");
    }
    let strings: Vec<(u32, &str)> = scratch.string_table().entries().collect();
    wire::write_definitions(writer, &strings, scratch.len(), scratch.entries())?;

    let threads = runtime.lock_threads();
    for entry in threads.iter() {
        // Safety: serialization runs under the quiescence contract; no
        // owning thread is emitting while we hold the registration lock.
        let buffer = unsafe { entry.buffer.get() };
        let mut chunk_flags = 0;
        if buffer.overflowed() {
            log::warn!(
                "thread {} ({:?}) overflowed its buffer; trailing events were dropped",
                entry.thread_id,
                entry.name
            );
            chunk_flags |= wire::chunk_flags::OVERFLOWED;
        }
        let name_id = buffer.string_table_mut().intern(&entry.name);
        let strings: Vec<(u32, &str)> = buffer.string_table().entries().collect();
        wire::write_thread_chunk(
            writer,
            entry.thread_id,
            name_id,
            chunk_flags,
            &strings,
            buffer.len(),
            buffer.entries(),
        )?;
    }

    Ok(())
}
