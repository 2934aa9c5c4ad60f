use std::io::{self, Write};

use crate::format::{padding_for, FORMAT_VERSION, TRACE_MAGIC};

fn write_word<W: Write>(writer: &mut W, word: u32) -> io::Result<()> {
    writer.write_all(&word.to_le_bytes())
}

/// Writes the magic and format-version prelude.
pub fn write_header<W: Write>(writer: &mut W) -> io::Result<()> {
    write_word(writer, TRACE_MAGIC)?;
    write_word(writer, FORMAT_VERSION)
}

// String table payload: count, then for each entry its id, byte length, utf-8
// bytes and zero padding to the next word boundary.
fn write_string_table<W: Write>(writer: &mut W, strings: &[(u32, &str)]) -> io::Result<()> {
    write_word(writer, strings.len() as u32)?;
    for (id, value) in strings {
        write_word(writer, *id)?;
        write_word(writer, value.len() as u32)?;
        writer.write_all(value.as_bytes())?;
        let padding = padding_for(value.len());
        if padding > 0 {
            writer.write_all(&[0u8; 3][..padding])?;
        }
    }
    Ok(())
}

fn write_entry_stream<W: Write>(
    writer: &mut W,
    entry_count: usize,
    entries: impl Iterator<Item = u32>,
) -> io::Result<()> {
    write_word(writer, entry_count as u32)?;
    for entry in entries {
        write_word(writer, entry)?;
    }
    Ok(())
}

/// Writes the event-definition section: the scratch string table followed by
/// the stream of `wtf.event#define` records.
pub fn write_definitions<W: Write>(
    writer: &mut W,
    strings: &[(u32, &str)],
    entry_count: usize,
    entries: impl Iterator<Item = u32>,
) -> io::Result<()> {
    write_string_table(writer, strings)?;
    write_entry_stream(writer, entry_count, entries)
}

/// Writes one thread chunk: the metadata record (thread id, interned name id,
/// chunk flags), the thread's string table and its raw entry stream.
pub fn write_thread_chunk<W: Write>(
    writer: &mut W,
    thread_id: u32,
    name_id: u32,
    flags: u32,
    strings: &[(u32, &str)],
    entry_count: usize,
    entries: impl Iterator<Item = u32>,
) -> io::Result<()> {
    write_word(writer, thread_id)?;
    write_word(writer, name_id)?;
    write_word(writer, flags)?;
    write_string_table(writer, strings)?;
    write_entry_stream(writer, entry_count, entries)
}
