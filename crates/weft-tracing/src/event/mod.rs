//! Typed events and their registration machinery.

pub mod args;

mod definition;
pub use definition::{flags, EventClass, EventDefinition};

mod registry;
pub use registry::{EventRegistry, FIRST_USER_WIRE_ID};

use std::marker::PhantomData;

use once_cell::sync::OnceCell;

use crate::buffer::EventBuffer;
use crate::dispatch;
use crate::event::args::EventArgs;
use crate::time;

use weft_tracing_wire::SCOPE_LEAVE_WIRE_ID;

/// A declarable event over the argument type list `Args`.
///
/// Call sites hold one `EventIf` per instrumentation point, usually in a
/// `static`. Construction is `const` and free; the wire id is allocated and
/// the definition registered on the first emission, so a declaration that is
/// never hit never touches the registry.
///
/// The `ENABLED` parameter selects between the real implementation and a
/// no-op twin with the same surface. User code goes through the
/// [`crate::prelude::Event`] alias (or the `enabled`/`disabled` module
/// aliases) rather than naming the switch directly.
pub struct EventIf<const ENABLED: bool, Args: EventArgs> {
    event_class: EventClass,
    flags: u32,
    name_spec: &'static str,
    wire_id: OnceCell<u32>,
    // Non-zero only for the standard events, which own fixed low ids.
    fixed_wire_id: u32,
    _args: PhantomData<fn(Args)>,
}

impl<const ENABLED: bool, Args: EventArgs> EventIf<ENABLED, Args> {
    /// A standard instance event.
    pub const fn instance(name_spec: &'static str) -> Self {
        Self::with_class(EventClass::Instance, 0, name_spec)
    }

    pub const fn with_class(event_class: EventClass, flags: u32, name_spec: &'static str) -> Self {
        Self {
            event_class,
            flags,
            name_spec,
            wire_id: OnceCell::new(),
            fixed_wire_id: 0,
            _args: PhantomData,
        }
    }

    /// An event with a known wire id. Only the standard events use this.
    pub(crate) const fn with_wire_id(
        wire_id: u32,
        event_class: EventClass,
        flags: u32,
        name_spec: &'static str,
    ) -> Self {
        Self {
            event_class,
            flags,
            name_spec,
            wire_id: OnceCell::new(),
            fixed_wire_id: wire_id,
            _args: PhantomData,
        }
    }

    /// The event's wire id, allocating it and registering the definition on
    /// first use.
    pub fn wire_id(&self) -> u32 {
        *self.wire_id.get_or_init(|| {
            let wire_id = if self.fixed_wire_id != 0 {
                self.fixed_wire_id
            } else {
                registry::next_wire_id()
            };
            EventRegistry::global().add(EventDefinition::new::<Args>(
                wire_id,
                self.event_class,
                self.flags,
                self.name_spec,
            ));
            wire_id
        })
    }

    /// Appends the record header and encoded arguments to `buffer`.
    pub fn invoke_specific(&self, buffer: &mut EventBuffer, args: Args::Values<'_>) {
        if !ENABLED {
            return;
        }
        buffer.add_entry(self.wire_id());
        buffer.add_entry(time::now_micros());
        Args::emit(args, buffer);
    }

    /// Emits against the current thread's buffer; a no-op when the thread is
    /// not enabled.
    pub fn invoke(&self, args: Args::Values<'_>) {
        if !ENABLED {
            return;
        }
        dispatch::with_thread_buffer(|buffer| self.invoke_specific(buffer, args));
    }
}

/// An event that brackets a scope: `enter` emits a record through the event's
/// own schema, `leave` emits the shared scope-leave record.
///
/// This type tracks enter and leave but does not pair them; the RAII pairing
/// lives in [`crate::guards::ScopeGuardIf`].
pub struct ScopedEventIf<const ENABLED: bool, Args: EventArgs> {
    event: EventIf<ENABLED, Args>,
}

impl<const ENABLED: bool, Args: EventArgs> ScopedEventIf<ENABLED, Args> {
    pub const fn new(name_spec: &'static str) -> Self {
        Self {
            event: EventIf::with_class(EventClass::Scoped, 0, name_spec),
        }
    }

    pub fn enter_specific(&self, buffer: &mut EventBuffer, args: Args::Values<'_>) {
        self.event.invoke_specific(buffer, args);
    }

    pub fn leave_specific(&self, buffer: &mut EventBuffer) {
        if !ENABLED {
            return;
        }
        // Every scope shares one leave record, so the closing side never
        // consults this event's schema.
        buffer.add_entry(SCOPE_LEAVE_WIRE_ID);
        buffer.add_entry(time::now_micros());
    }

    pub fn enter(&self, args: Args::Values<'_>) {
        if !ENABLED {
            return;
        }
        dispatch::with_thread_buffer(|buffer| self.enter_specific(buffer, args));
    }

    pub fn leave(&self) {
        if !ENABLED {
            return;
        }
        dispatch::with_thread_buffer(|buffer| self.leave_specific(buffer));
    }
}
