//! In-process event tracing with a compact binary trace format.
//!
//! Instrumented code declares long-lived event objects and sprinkles
//! invocations through hot paths; each enabled thread appends fixed-width
//! records to its own buffer with no locks and no allocation on the steady
//! state. A process-wide runtime serializes the accumulated buffers, together
//! with every registered event schema, into a single trace stream a Web
//! Tracing Framework viewer can open.
//!
//! # Examples
//! ```
//! use weft_tracing::prelude::*;
//! use weft_tracing::{trace_event, trace_scope};
//!
//! // Bind a buffer to this thread for as long as the guard lives.
//! let _thread = ThreadGuard::new("main");
//!
//! {
//!     trace_scope!("Demo#work");
//!     trace_event!("Demo#step: index", (Int32), (1));
//! }
//!
//! let mut trace = Vec::new();
//! Runtime::global().write_trace(&mut trace).unwrap();
//! assert!(!trace.is_empty());
//! ```
//!
//! Tracing compiles out entirely when the `enable` feature is off; modules
//! can also opt out locally by importing `disabled::*` instead of the
//! prelude.

// crate-specific lint exceptions:
#![allow(unsafe_code, clippy::missing_errors_doc)]

pub mod buffer;
pub mod dispatch;
pub mod errors;
pub mod event;
pub mod guards;
pub mod runtime;
pub mod standard_events;
pub mod string_table;

#[macro_use]
mod macros;
mod serializer;
mod time;

pub use time::now_micros;

/// Master switch for the user-visible aliases, driven by the `enable`
/// feature. Standard events ignore it; they must exist for serialization.
pub const MASTER_ENABLE: bool = cfg!(feature = "enable");

/// Aliases that follow the crate's master switch.
pub mod prelude {
    pub use crate::event::args::{Ascii, Int16, Int32, Uint16, Uint32};
    pub use crate::guards::ThreadGuard;
    pub use crate::runtime::Runtime;

    pub type Event<Args> = crate::event::EventIf<{ crate::MASTER_ENABLE }, Args>;
    pub type ScopedEvent<Args> = crate::event::ScopedEventIf<{ crate::MASTER_ENABLE }, Args>;
    pub type ScopeGuard<'a, Args> = crate::guards::ScopeGuardIf<'a, { crate::MASTER_ENABLE }, Args>;
}

/// Aliases that are always live, whatever the master switch says.
pub mod enabled {
    pub use crate::event::args::{Ascii, Int16, Int32, Uint16, Uint32};
    pub use crate::guards::ThreadGuard;
    pub use crate::runtime::Runtime;

    pub type Event<Args> = crate::event::EventIf<true, Args>;
    pub type ScopedEvent<Args> = crate::event::ScopedEventIf<true, Args>;
    pub type ScopeGuard<'a, Args> = crate::guards::ScopeGuardIf<'a, true, Args>;
}

/// No-op aliases: declarations made through these compile to nothing and
/// never touch the registry.
pub mod disabled {
    pub use crate::event::args::{Ascii, Int16, Int32, Uint16, Uint32};
    pub use crate::guards::ThreadGuard;
    pub use crate::runtime::Runtime;

    pub type Event<Args> = crate::event::EventIf<false, Args>;
    pub type ScopedEvent<Args> = crate::event::ScopedEventIf<false, Args>;
    pub type ScopeGuard<'a, Args> = crate::guards::ScopeGuardIf<'a, false, Args>;
}

pub use prelude::*;
