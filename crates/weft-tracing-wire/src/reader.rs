use std::collections::HashMap;

use anyhow::{bail, Context, Result};

use crate::format::{DEFINE_EVENT_WIRE_ID, EMPTY_STRING_ID, FORMAT_VERSION, TRACE_MAGIC};

/// One `wtf.event#define` record from the definition section.
#[derive(Debug, Clone)]
pub struct EventDefRecord {
    pub wire_id: u32,
    pub event_class: u16,
    pub flags: u32,
    pub name: String,
    pub args: String,
    pub timestamp: u32,
}

/// One thread's chunk: metadata, interned strings and the raw entry stream.
#[derive(Debug, Clone)]
pub struct ThreadChunk {
    pub thread_id: u32,
    pub name: String,
    pub flags: u32,
    pub strings: HashMap<u32, String>,
    pub entries: Vec<u32>,
}

impl ThreadChunk {
    /// Resolves an interned string id; id 0 is the empty string.
    pub fn string(&self, id: u32) -> Result<&str> {
        if id == EMPTY_STRING_ID {
            return Ok("");
        }
        match self.strings.get(&id) {
            Some(value) => Ok(value.as_str()),
            None => bail!("string id {} not present in chunk string table", id),
        }
    }
}

/// A fully parsed trace stream.
#[derive(Debug, Clone)]
pub struct TraceFile {
    pub definitions: Vec<EventDefRecord>,
    pub threads: Vec<ThreadChunk>,
}

struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn is_at_end(&self) -> bool {
        self.offset >= self.bytes.len()
    }

    fn read_word(&mut self) -> Result<u32> {
        if self.bytes.len() - self.offset < 4 {
            bail!("unexpected end of trace at offset {}", self.offset);
        }
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.bytes[self.offset..self.offset + 4]);
        self.offset += 4;
        Ok(u32::from_le_bytes(raw))
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.bytes.len() - self.offset < len {
            bail!("unexpected end of trace at offset {}", self.offset);
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn read_string_table(&mut self) -> Result<HashMap<u32, String>> {
        let count = self.read_word()? as usize;
        let mut strings = HashMap::with_capacity(count);
        for _ in 0..count {
            let id = self.read_word()?;
            let len = self.read_word()? as usize;
            let raw = self.read_bytes(len)?;
            let value = std::str::from_utf8(raw)
                .with_context(|| format!("string {} is not valid utf-8", id))?;
            self.read_bytes(crate::format::padding_for(len))?;
            if strings.insert(id, value.to_owned()).is_some() {
                bail!("duplicate string id {} in string table", id);
            }
        }
        Ok(strings)
    }

    fn read_entry_stream(&mut self) -> Result<Vec<u32>> {
        let count = self.read_word()? as usize;
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            entries.push(self.read_word()?);
        }
        Ok(entries)
    }
}

fn resolve(strings: &HashMap<u32, String>, id: u32) -> Result<String> {
    if id == EMPTY_STRING_ID {
        return Ok(String::new());
    }
    match strings.get(&id) {
        Some(value) => Ok(value.clone()),
        None => bail!("string id {} not present in definition string table", id),
    }
}

// The definition section is a stream of define-event records, each exactly
// seven words: wire id, timestamp, then the five encoded arguments.
fn parse_definitions(
    strings: &HashMap<u32, String>,
    entries: &[u32],
) -> Result<Vec<EventDefRecord>> {
    const DEFINE_RECORD_WORDS: usize = 7;
    if entries.len() % DEFINE_RECORD_WORDS != 0 {
        bail!(
            "definition section of {} words is not a whole number of records",
            entries.len()
        );
    }
    let mut definitions = Vec::with_capacity(entries.len() / DEFINE_RECORD_WORDS);
    for record in entries.chunks_exact(DEFINE_RECORD_WORDS) {
        if record[0] != DEFINE_EVENT_WIRE_ID {
            bail!(
                "expected a define-event record, found wire id {}",
                record[0]
            );
        }
        definitions.push(EventDefRecord {
            timestamp: record[1],
            wire_id: record[2],
            event_class: record[3] as u16,
            flags: record[4],
            name: resolve(strings, record[5])?,
            args: resolve(strings, record[6])?,
        });
    }
    Ok(definitions)
}

/// Parses a serialized trace back into definitions and thread chunks.
pub fn read_trace(bytes: &[u8]) -> Result<TraceFile> {
    let mut cursor = Cursor::new(bytes);
    let magic = cursor.read_word()?;
    if magic != TRACE_MAGIC {
        bail!("not a trace stream: bad magic {:#010x}", magic);
    }
    let version = cursor.read_word()?;
    if version != FORMAT_VERSION {
        bail!(
            "unsupported trace format version {} (expected {})",
            version,
            FORMAT_VERSION
        );
    }

    let definition_strings = cursor.read_string_table()?;
    let definition_entries = cursor.read_entry_stream()?;
    let definitions = parse_definitions(&definition_strings, &definition_entries)?;

    let mut threads = Vec::new();
    while !cursor.is_at_end() {
        let thread_id = cursor.read_word()?;
        let name_id = cursor.read_word()?;
        let flags = cursor.read_word()?;
        let strings = cursor.read_string_table()?;
        let entries = cursor.read_entry_stream()?;
        let name = if name_id == EMPTY_STRING_ID {
            String::new()
        } else {
            match strings.get(&name_id) {
                Some(value) => value.clone(),
                None => bail!("thread {} names a missing string id {}", thread_id, name_id),
            }
        };
        threads.push(ThreadChunk {
            thread_id,
            name,
            flags,
            strings,
            entries,
        });
    }

    Ok(TraceFile {
        definitions,
        threads,
    })
}
