/// Declares an instance event and invokes it in place.
///
/// The `Event` alias and the argument-type markers are resolved where the
/// macro is invoked, so the module's imports are the lexical enable switch:
/// bring in `weft_tracing::prelude::*` to follow the crate's master switch,
/// or `weft_tracing::enabled::*` / `weft_tracing::disabled::*` to force one
/// side for every declaration in scope.
///
/// # Examples
///
/// ```
/// use weft_tracing::prelude::*;
/// use weft_tracing::trace_event;
///
/// # fn main() {
/// trace_event!("Example#tick");
/// trace_event!("Example#tock: count", (Int32), (42));
/// # }
/// ```
#[macro_export]
macro_rules! trace_event {
    ($spec:literal) => {{
        static _TRACE_EVENT: Event<()> = Event::instance($spec);
        _TRACE_EVENT.invoke(());
    }};
    ($spec:literal, ($($arg_type:ty),+), ($($value:expr),+)) => {{
        static _TRACE_EVENT: Event<($($arg_type,)+)> = Event::instance($spec);
        _TRACE_EVENT.invoke(($($value,)+));
    }};
}

/// Declares a scoped event and opens a guard that leaves when the enclosing
/// scope ends.
///
/// Resolves `ScopedEvent` and `ScopeGuard` at the invocation site, like
/// [`trace_event!`]. Two scopes in the same block need the named form, which
/// takes an ident for the backing static.
///
/// # Examples
///
/// ```
/// use weft_tracing::prelude::*;
/// use weft_tracing::trace_scope;
///
/// # fn main() {
/// trace_scope!("Example#frame");
/// trace_scope!(DETAIL, "Example#detail: index", (Int32), (7));
/// # }
/// ```
#[macro_export]
macro_rules! trace_scope {
    ($scope_name:ident, $spec:literal) => {
        static $scope_name: ScopedEvent<()> = ScopedEvent::new($spec);
        let _trace_guard = ScopeGuard::new(&$scope_name);
        _trace_guard.enter(());
    };
    ($scope_name:ident, $spec:literal, ($($arg_type:ty),+), ($($value:expr),+)) => {
        static $scope_name: ScopedEvent<($($arg_type,)+)> = ScopedEvent::new($spec);
        let _trace_guard = ScopeGuard::new(&$scope_name);
        _trace_guard.enter(($($value,)+));
    };
    ($spec:literal) => {
        $crate::trace_scope!(_TRACE_SCOPE, $spec);
    };
    ($spec:literal, ($($arg_type:ty),+), ($($value:expr),+)) => {
        $crate::trace_scope!(_TRACE_SCOPE, $spec, ($($arg_type),+), ($($value),+));
    };
}

/// Enables tracing for the current thread under the given name.
///
/// Thread enablement is runtime state, not a declaration, so it does not
/// participate in the lexical enable switch.
#[macro_export]
macro_rules! trace_enable_thread {
    ($name:expr) => {
        $crate::runtime::Runtime::global().enable_current_thread($name);
    };
}

/// Enables tracing for the current thread when `condition` holds.
#[macro_export]
macro_rules! trace_enable_thread_if {
    ($condition:expr, $name:expr) => {
        if $condition {
            $crate::runtime::Runtime::global().enable_current_thread($name);
        }
    };
}

/// Disables tracing for the current thread. Already recorded events stay
/// registered for serialization.
#[macro_export]
macro_rules! trace_disable_thread {
    () => {
        $crate::runtime::Runtime::global().disable_current_thread();
    };
}

/// Marks the start of a frame on the current thread.
#[macro_export]
macro_rules! trace_frame_start {
    ($number:expr) => {
        $crate::dispatch::with_thread_buffer(|buffer| {
            $crate::standard_events::frame_start(buffer, $number)
        });
    };
}

/// Marks the end of a frame on the current thread.
#[macro_export]
macro_rules! trace_frame_end {
    ($number:expr) => {
        $crate::dispatch::with_thread_buffer(|buffer| {
            $crate::standard_events::frame_end(buffer, $number)
        });
    };
}
