//! The builtin event schemas that occupy the reserved low wire-id range.
//!
//! These are always the real (enabled) event types whatever the master
//! switch says: the serializer needs `wtf.event#define` to materialize
//! schemas even in a build whose user-facing aliases are compiled out.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::buffer::EventBuffer;
use crate::event::args::{Ascii, Uint16, Uint32};
use crate::event::{flags, EventClass, EventIf};

pub use weft_tracing_wire::{
    CREATE_ZONE_WIRE_ID, DEFINE_EVENT_WIRE_ID, FRAME_END_WIRE_ID, FRAME_START_WIRE_ID,
    SCOPE_LEAVE_WIRE_ID, SET_ZONE_WIRE_ID,
};

type Builtin<Args> = EventIf<true, Args>;

static DEFINE_EVENT: Builtin<(Uint16, Uint16, Uint32, Ascii, Ascii)> = EventIf::with_wire_id(
    DEFINE_EVENT_WIRE_ID,
    EventClass::Instance,
    flags::BUILTIN | flags::INTERNAL,
    "wtf.event#define: wireId, eventClass, flags, name, args",
);

static SCOPE_LEAVE: Builtin<()> = EventIf::with_wire_id(
    SCOPE_LEAVE_WIRE_ID,
    EventClass::Instance,
    flags::BUILTIN | flags::INTERNAL,
    "wtf.scope#leave",
);

static CREATE_ZONE: Builtin<(Uint16, Ascii, Ascii, Ascii)> = EventIf::with_wire_id(
    CREATE_ZONE_WIRE_ID,
    EventClass::Instance,
    flags::BUILTIN,
    "wtf.zone#create: zoneId, name, type, location",
);

static SET_ZONE: Builtin<(Uint16,)> = EventIf::with_wire_id(
    SET_ZONE_WIRE_ID,
    EventClass::Instance,
    flags::BUILTIN,
    "wtf.zone#set: zoneId",
);

static FRAME_START: Builtin<(Uint32,)> = EventIf::with_wire_id(
    FRAME_START_WIRE_ID,
    EventClass::Instance,
    flags::BUILTIN,
    "wtf.timing#frameStart: number",
);

static FRAME_END: Builtin<(Uint32,)> = EventIf::with_wire_id(
    FRAME_END_WIRE_ID,
    EventClass::Instance,
    flags::BUILTIN,
    "wtf.timing#frameEnd: number",
);

static NEXT_ZONE_ID: AtomicU32 = AtomicU32::new(1);

/// Registers every standard schema. Called when the runtime comes up and
/// again before serialization, so the definition section always carries the
/// builtins even if no user event ever fired.
pub(crate) fn register_all() {
    DEFINE_EVENT.wire_id();
    SCOPE_LEAVE.wire_id();
    CREATE_ZONE.wire_id();
    SET_ZONE.wire_id();
    FRAME_START.wire_id();
    FRAME_END.wire_id();
}

pub(crate) fn reset_zone_ids() {
    NEXT_ZONE_ID.store(1, Ordering::Relaxed);
}

/// Materializes one event schema into `buffer`. The serializer calls this
/// once per registered definition.
pub fn define_event(
    buffer: &mut EventBuffer,
    wire_id: u16,
    event_class: u16,
    flags: u32,
    name: &str,
    args: &str,
) {
    DEFINE_EVENT.invoke_specific(buffer, (wire_id, event_class, flags, name, args));
}

/// Terminates the innermost open scope in `buffer`.
pub fn scope_leave(buffer: &mut EventBuffer) {
    SCOPE_LEAVE.invoke_specific(buffer, ());
}

/// Creates a new zone and returns its id.
pub fn create_zone(buffer: &mut EventBuffer, name: &str, zone_type: &str, location: &str) -> u32 {
    let zone_id = NEXT_ZONE_ID.fetch_add(1, Ordering::Relaxed);
    CREATE_ZONE.invoke_specific(buffer, (zone_id as u16, name, zone_type, location));
    zone_id
}

/// Switches subsequent records in `buffer` to the given zone.
pub fn set_zone(buffer: &mut EventBuffer, zone_id: u32) {
    SET_ZONE.invoke_specific(buffer, (zone_id as u16,));
}

/// Marks the start of frame `number`.
pub fn frame_start(buffer: &mut EventBuffer, number: u32) {
    FRAME_START.invoke_specific(buffer, (number,));
}

/// Marks the end of frame `number`.
pub fn frame_end(buffer: &mut EventBuffer, number: u32) {
    FRAME_END.invoke_specific(buffer, (number,));
}
