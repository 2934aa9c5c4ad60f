//! End-to-end behavior of the tracer, from enabling threads through decoding
//! serialized traces.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;

use weft_tracing::prelude::*;
use weft_tracing::{dispatch, trace_event, trace_scope};
use weft_tracing_wire::{
    chunk_flags, decode_thread_events, read_trace, ArgValue, SCOPE_LEAVE_WIRE_ID,
};

lazy_static::lazy_static! {
    // The runtime is process-wide; these tests take turns.
    static ref TEST_LOCK: Mutex<()> = Mutex::new(());
}

fn test_setup() -> MutexGuard<'static, ()> {
    let guard = TEST_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    Runtime::global().disable_current_thread();
    Runtime::global().reset_for_testing();
    guard
}

fn serialize() -> Vec<u8> {
    let mut out = Vec::new();
    Runtime::global().write_trace(&mut out).unwrap();
    out
}

// Scenario: the thread was never enabled, so nothing is buffered and nothing
// but the standard definitions reaches the trace.
#[test]
fn test_disabled_thread_records_nothing() {
    let _lock = test_setup();

    trace_event!("ScenarioA#Emit");
    assert!(dispatch::with_thread_buffer(|_| ()).is_none());

    let trace = read_trace(&serialize()).unwrap();
    assert!(trace.threads.is_empty());
    assert!(trace
        .definitions
        .iter()
        .any(|definition| definition.name == "wtf.event#define"));
    // The declaration was never hit with a live buffer, so it never
    // registered.
    assert!(!trace
        .definitions
        .iter()
        .any(|definition| definition.name == "ScenarioA#Emit"));
}

#[test]
fn test_single_event_round_trips() {
    let _lock = test_setup();
    Runtime::global().enable_current_thread("T1");

    trace_event!("ScenarioB#Value: i", (Int32), (42));

    let trace = read_trace(&serialize()).unwrap();
    assert_eq!(trace.threads.len(), 1);
    let chunk = &trace.threads[0];
    assert_eq!(chunk.name, "T1");

    let definition = trace
        .definitions
        .iter()
        .find(|definition| definition.name == "ScenarioB#Value")
        .unwrap();
    assert_eq!(definition.args, "int32 i");

    let events = decode_thread_events(&trace.definitions, chunk).unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].name, "wtf.zone#create");
    assert_eq!(events[1].name, "wtf.zone#set");
    assert_eq!(events[2].name, "ScenarioB#Value");
    assert_eq!(
        events[2].args,
        vec![(String::from("i"), ArgValue::Int32(42))]
    );

    Runtime::global().disable_current_thread();
}

#[test]
fn test_nested_scopes_share_the_leave_record() {
    let _lock = test_setup();
    Runtime::global().enable_current_thread("T1");

    {
        trace_scope!(OUTER, "ScenarioC#Outer");
        {
            trace_scope!(INNER, "ScenarioC#Inner");
        }
    }

    let trace = read_trace(&serialize()).unwrap();
    let leave = trace
        .definitions
        .iter()
        .find(|definition| definition.name == "wtf.scope#leave")
        .unwrap();
    assert_eq!(leave.wire_id, SCOPE_LEAVE_WIRE_ID);

    let events = decode_thread_events(&trace.definitions, &trace.threads[0]).unwrap();
    let names: Vec<&str> = events.iter().map(|event| event.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "wtf.zone#create",
            "wtf.zone#set",
            "ScenarioC#Outer",
            "ScenarioC#Inner",
            "wtf.scope#leave",
            "wtf.scope#leave",
        ]
    );
    for pair in events[2..].windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }

    Runtime::global().disable_current_thread();
}

mod hidden {
    // Importing the disabled aliases turns every declaration in this module
    // into a no-op, whatever the crate-level switch says.
    use weft_tracing::disabled::*;

    pub fn emit() {
        weft_tracing::trace_event!("ScenarioD#Hidden");
    }
}

#[test]
fn test_lexically_disabled_declarations_are_silent() {
    let _lock = test_setup();
    Runtime::global().enable_current_thread("T1");

    hidden::emit();

    let trace = read_trace(&serialize()).unwrap();
    assert!(!trace
        .definitions
        .iter()
        .any(|definition| definition.name == "ScenarioD#Hidden"));
    let events = decode_thread_events(&trace.definitions, &trace.threads[0]).unwrap();
    // Only the enable-time zone metadata.
    assert_eq!(events.len(), 2);

    Runtime::global().disable_current_thread();
}

#[test]
fn test_string_arguments_intern_once() {
    let _lock = test_setup();
    Runtime::global().enable_current_thread("T1");

    static MSG: Event<(Ascii,)> = Event::instance("ScenarioE#Msg: s");
    MSG.invoke(("hello",));
    MSG.invoke(("hello",));

    let (hello_count, entries) = dispatch::with_thread_buffer(|buffer| {
        let hello_count = buffer
            .string_table()
            .entries()
            .filter(|(_, value)| *value == "hello")
            .count();
        (hello_count, buffer.entries().collect::<Vec<u32>>())
    })
    .unwrap();
    assert_eq!(hello_count, 1);
    // Both records reference the same interned id.
    let len = entries.len();
    assert_eq!(entries[len - 1], entries[len - 4]);

    let trace = read_trace(&serialize()).unwrap();
    let events = decode_thread_events(&trace.definitions, &trace.threads[0]).unwrap();
    assert_eq!(
        events[2].args,
        vec![(String::from("s"), ArgValue::Ascii(String::from("hello")))]
    );
    assert_eq!(events[2].args, events[3].args);

    Runtime::global().disable_current_thread();
}

#[test]
fn test_threads_serialize_in_registration_order() {
    let _lock = test_setup();

    for name in ["A", "B", "C"] {
        thread::spawn(move || {
            Runtime::global().enable_current_thread(name);
            match name {
                "A" => trace_event!("ScenarioF#A"),
                "B" => trace_event!("ScenarioF#B"),
                _ => trace_event!("ScenarioF#C"),
            }
            Runtime::global().disable_current_thread();
        })
        .join()
        .unwrap();
    }

    let trace = read_trace(&serialize()).unwrap();
    let names: Vec<&str> = trace
        .threads
        .iter()
        .map(|chunk| chunk.name.as_str())
        .collect();
    assert_eq!(names, vec!["A", "B", "C"]);

    for chunk in &trace.threads {
        let events = decode_thread_events(&trace.definitions, chunk).unwrap();
        let own = format!("ScenarioF#{}", chunk.name);
        assert_eq!(events.len(), 3);
        assert_eq!(events[2].name, own);
        assert!(events
            .iter()
            .all(|event| event.name == own || event.name.starts_with("wtf.")));
    }
}

#[test]
fn test_overflow_flag_survives_serialization() {
    let _lock = test_setup();
    // Small enough that the enable-time metadata already trips the cap.
    Runtime::global().enable_current_thread_with_capacity("tiny", 8);
    for _ in 0..4 {
        trace_event!("Overflow#Spin");
    }
    assert!(dispatch::with_thread_buffer(|buffer| buffer.overflowed()).unwrap());

    for _ in 0..2 {
        let trace = read_trace(&serialize()).unwrap();
        let chunk = &trace.threads[0];
        assert_eq!(chunk.flags & chunk_flags::OVERFLOWED, chunk_flags::OVERFLOWED);
        assert_eq!(chunk.entries.len(), 8);
        // The preserved prefix still decodes; the truncated tail is dropped.
        let events = decode_thread_events(&trace.definitions, chunk).unwrap();
        assert_eq!(events[0].name, "wtf.zone#create");
    }

    Runtime::global().disable_current_thread();
}

#[test]
fn test_save_to_file_truncates_existing_file() {
    let _lock = test_setup();
    Runtime::global().enable_current_thread("file");
    trace_event!("File#Event");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.wtf-trace");
    std::fs::write(&path, b"stale contents").unwrap();

    Runtime::global().save_to_file(&path).unwrap();
    let trace = read_trace(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(trace.threads.len(), 1);
    assert_eq!(trace.threads[0].name, "file");

    Runtime::global().disable_current_thread();
}
