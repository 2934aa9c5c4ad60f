use std::collections::HashMap;

use anyhow::{bail, Result};

use crate::reader::{EventDefRecord, ThreadChunk};

/// The canonical argument types a define-event signature can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    Int16,
    Uint16,
    Int32,
    Uint32,
    Ascii,
}

impl ArgType {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "int16" => Some(Self::Int16),
            "uint16" => Some(Self::Uint16),
            "int32" => Some(Self::Int32),
            "uint32" => Some(Self::Uint32),
            "ascii" => Some(Self::Ascii),
            _ => None,
        }
    }
}

/// A decoded argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Ascii(String),
}

/// One event reconstructed from a thread's entry stream.
#[derive(Debug, Clone)]
pub struct DecodedEvent {
    pub name: String,
    pub timestamp: u32,
    pub args: Vec<(String, ArgValue)>,
}

// "uint16 wireId, ascii name" -> [(Uint16, "wireId"), (Ascii, "name")]
fn parse_signature(signature: &str) -> Result<Vec<(ArgType, String)>> {
    if signature.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut args = Vec::new();
    for fragment in signature.split(',') {
        let fragment = fragment.trim();
        let (type_name, arg_name) = fragment.split_once(' ').unwrap_or((fragment, ""));
        let arg_type = match ArgType::from_name(type_name) {
            Some(arg_type) => arg_type,
            None => bail!("unknown argument type {} in signature {:?}", type_name, signature),
        };
        args.push((arg_type, arg_name.trim().to_owned()));
    }
    Ok(args)
}

/// Decodes a thread chunk's raw entries into named events using the schemas
/// from the trace's definition section.
///
/// A truncated record at the end of the stream (the mark of a buffer that hit
/// its soft cap mid-record) is dropped with a warning rather than failing the
/// whole chunk.
pub fn decode_thread_events(
    definitions: &[EventDefRecord],
    chunk: &ThreadChunk,
) -> Result<Vec<DecodedEvent>> {
    let mut schemas = HashMap::with_capacity(definitions.len());
    for definition in definitions {
        schemas.insert(
            definition.wire_id,
            (definition.name.clone(), parse_signature(&definition.args)?),
        );
    }

    let entries = &chunk.entries;
    let mut events = Vec::new();
    let mut cursor = 0usize;
    while cursor < entries.len() {
        let wire_id = entries[cursor];
        let (name, schema) = match schemas.get(&wire_id) {
            Some(schema) => schema,
            None => bail!("unknown wire id {} at entry {}", wire_id, cursor),
        };
        if entries.len() - cursor < 2 + schema.len() {
            log::warn!(
                "thread {}: truncated {} record at entry {}; dropping tail",
                chunk.thread_id,
                name,
                cursor
            );
            break;
        }
        let timestamp = entries[cursor + 1];
        cursor += 2;
        let mut args = Vec::with_capacity(schema.len());
        for (arg_type, arg_name) in schema {
            let word = entries[cursor];
            cursor += 1;
            let value = match arg_type {
                ArgType::Int16 => ArgValue::Int16(word as i16),
                ArgType::Uint16 => ArgValue::Uint16(word as u16),
                ArgType::Int32 => ArgValue::Int32(word as i32),
                ArgType::Uint32 => ArgValue::Uint32(word),
                ArgType::Ascii => ArgValue::Ascii(chunk.string(word)?.to_owned()),
            };
            args.push((arg_name.clone(), value));
        }
        events.push(DecodedEvent {
            name: name.clone(),
            timestamp,
            args,
        });
    }
    Ok(events)
}

#[cfg(test)]
mod test {
    use super::*;

    fn definition(wire_id: u32, name: &str, args: &str) -> EventDefRecord {
        EventDefRecord {
            wire_id,
            event_class: 0,
            flags: 0,
            name: name.to_owned(),
            args: args.to_owned(),
            timestamp: 0,
        }
    }

    fn chunk(strings: &[(u32, &str)], entries: &[u32]) -> ThreadChunk {
        ThreadChunk {
            thread_id: 1,
            name: String::from("T"),
            flags: 0,
            strings: strings
                .iter()
                .map(|(id, value)| (*id, (*value).to_owned()))
                .collect(),
            entries: entries.to_vec(),
        }
    }

    #[test]
    fn test_parse_signature() {
        let args = parse_signature("uint16 wireId, ascii name").unwrap();
        assert_eq!(args.len(), 2);
        assert_eq!(args[0], (ArgType::Uint16, String::from("wireId")));
        assert_eq!(args[1], (ArgType::Ascii, String::from("name")));
        assert!(parse_signature("").unwrap().is_empty());
        assert!(parse_signature("float x").is_err());
    }

    #[test]
    fn test_decodes_typed_arguments() {
        let definitions = vec![definition(100, "A#B", "int16 a, ascii s")];
        let chunk = chunk(&[(1, "hello")], &[100, 55, 0xFFFF_FFFF, 1]);
        let events = decode_thread_events(&definitions, &chunk).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "A#B");
        assert_eq!(events[0].timestamp, 55);
        assert_eq!(events[0].args[0].1, ArgValue::Int16(-1));
        assert_eq!(events[0].args[1].1, ArgValue::Ascii(String::from("hello")));
    }

    #[test]
    fn test_unknown_wire_id_is_an_error() {
        let definitions = vec![definition(100, "A#B", "")];
        let chunk = chunk(&[], &[101, 0]);
        assert!(decode_thread_events(&definitions, &chunk).is_err());
    }

    #[test]
    fn test_truncated_tail_is_dropped() {
        let definitions = vec![definition(100, "A#B", "int32 a")];
        // Full record, then a record cut off after the timestamp.
        let chunk = chunk(&[], &[100, 1, 42, 100, 2]);
        let events = decode_thread_events(&definitions, &chunk).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].args[0].1, ArgValue::Int32(42));
    }
}
