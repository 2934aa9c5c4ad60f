//! Typed event arguments.
//!
//! Each supported argument type is a marker implementing [`EventArg`]: it
//! names itself for the canonical signature and knows how to encode one value
//! into 32-bit entries. Tuples of markers implement [`EventArgs`] and drive
//! both emission and signature materialization, so the whole cost of a typed
//! argument list is resolved at compile time.

use std::fmt::Write as _;

use crate::buffer::EventBuffer;
use crate::string_table::EMPTY_STRING_ID;

/// One supported argument type.
pub trait EventArg {
    /// Canonical name used in argument signatures, e.g. `int32`.
    const TYPE_NAME: &'static str;

    /// The value callers pass at emission time.
    type Value<'a>;

    /// Encodes `value` as one or more 32-bit entries.
    fn emit(value: Self::Value<'_>, buffer: &mut EventBuffer);
}

/// Signed 16-bit argument, sign-extended into its entry.
pub enum Int16 {}

/// Unsigned 16-bit argument.
pub enum Uint16 {}

/// Signed 32-bit argument.
pub enum Int32 {}

/// Unsigned 32-bit argument.
pub enum Uint32 {}

/// Borrowed string argument, encoded as its string-table id.
pub enum Ascii {}

impl EventArg for Int16 {
    const TYPE_NAME: &'static str = "int16";
    type Value<'a> = i16;

    fn emit(value: i16, buffer: &mut EventBuffer) {
        buffer.add_entry(value as i32 as u32);
    }
}

impl EventArg for Uint16 {
    const TYPE_NAME: &'static str = "uint16";
    type Value<'a> = u16;

    fn emit(value: u16, buffer: &mut EventBuffer) {
        buffer.add_entry(u32::from(value));
    }
}

impl EventArg for Int32 {
    const TYPE_NAME: &'static str = "int32";
    type Value<'a> = i32;

    fn emit(value: i32, buffer: &mut EventBuffer) {
        buffer.add_entry(value as u32);
    }
}

impl EventArg for Uint32 {
    const TYPE_NAME: &'static str = "uint32";
    type Value<'a> = u32;

    fn emit(value: u32, buffer: &mut EventBuffer) {
        buffer.add_entry(value);
    }
}

impl EventArg for Ascii {
    const TYPE_NAME: &'static str = "ascii";
    type Value<'a> = &'a str;

    fn emit(value: &str, buffer: &mut EventBuffer) {
        let id = if value.is_empty() {
            EMPTY_STRING_ID
        } else {
            buffer.string_table_mut().intern(value)
        };
        buffer.add_entry(id);
    }
}

/// An ordered list of argument types, realized as a tuple of [`EventArg`]
/// markers.
pub trait EventArgs {
    const COUNT: usize;

    /// The tuple of values callers pass at emission time.
    type Values<'a>;

    /// Appends the canonical `<type> <name>, …` signature, taking argument
    /// names from the comma-separated `arg_names` and synthesizing
    /// `arg<index>` for any that are missing or blank. Excess names are
    /// ignored.
    fn append_signature(out: &mut String, arg_names: &str);

    /// Encodes the values in declaration order.
    fn emit(values: Self::Values<'_>, buffer: &mut EventBuffer);
}

// Merges one declared type with the matching fragment of the name list.
fn zip_argument(out: &mut String, index: usize, type_name: &str, arg_name: Option<&str>) {
    if index > 0 {
        out.push_str(", ");
    }
    out.push_str(type_name);
    out.push(' ');
    match arg_name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => out.push_str(name),
        None => {
            let _ = write!(out, "arg{}", index);
        }
    }
}

impl EventArgs for () {
    const COUNT: usize = 0;
    type Values<'a> = ();

    fn append_signature(_out: &mut String, _arg_names: &str) {}

    fn emit(_values: (), _buffer: &mut EventBuffer) {}
}

macro_rules! tuple_event_args {
    ($(($($arg:ident),+)),+ $(,)?) => {
        $(
            impl<$($arg: EventArg),+> EventArgs for ($($arg,)+) {
                const COUNT: usize = <[&'static str]>::len(&[$($arg::TYPE_NAME),+]);
                type Values<'a> = ($($arg::Value<'a>,)+);

                fn append_signature(out: &mut String, arg_names: &str) {
                    let mut names = arg_names.split(',');
                    let mut index = 0;
                    $(
                        zip_argument(out, index, $arg::TYPE_NAME, names.next());
                        index += 1;
                    )+
                    let _ = index;
                }

                #[allow(non_snake_case)]
                fn emit(values: Self::Values<'_>, buffer: &mut EventBuffer) {
                    let ($($arg,)+) = values;
                    $($arg::emit($arg, buffer);)+
                }
            }
        )+
    };
}

tuple_event_args!(
    (A1),
    (A1, A2),
    (A1, A2, A3),
    (A1, A2, A3, A4),
    (A1, A2, A3, A4, A5),
    (A1, A2, A3, A4, A5, A6),
    (A1, A2, A3, A4, A5, A6, A7),
    (A1, A2, A3, A4, A5, A6, A7, A8)
);

#[cfg(test)]
mod test {
    use super::*;

    fn signature<Args: EventArgs>(arg_names: &str) -> String {
        let mut out = String::new();
        Args::append_signature(&mut out, arg_names);
        out
    }

    #[test]
    fn test_missing_names_are_synthesized() {
        assert_eq!(signature::<(Int32, Int32)>(""), "int32 arg0, int32 arg1");
        assert_eq!(signature::<(Int32, Int32)>(" x"), "int32 x, int32 arg1");
    }

    #[test]
    fn test_whitespace_only_fragments_are_synthesized() {
        assert_eq!(signature::<(Int32, Uint32)>("  , y"), "int32 arg0, uint32 y");
    }

    #[test]
    fn test_excess_names_are_ignored() {
        assert_eq!(signature::<(Uint16,)>("a, b, c"), "uint16 a");
    }

    #[test]
    fn test_all_canonical_type_names() {
        assert_eq!(
            signature::<(Int16, Uint16, Int32, Uint32, Ascii)>("a, b, c, d, e"),
            "int16 a, uint16 b, int32 c, uint32 d, ascii e"
        );
    }

    #[test]
    fn test_scalar_encodings() {
        let mut buffer = EventBuffer::new();
        <(Int16, Uint16, Int32, Uint32)>::emit((-1, 7, -2, 9), &mut buffer);
        let entries: Vec<u32> = buffer.entries().collect();
        assert_eq!(entries, vec![0xFFFF_FFFF, 7, 0xFFFF_FFFE, 9]);
    }

    #[test]
    fn test_ascii_encodes_interned_id() {
        let mut buffer = EventBuffer::new();
        <(Ascii,)>::emit(("hello",), &mut buffer);
        <(Ascii,)>::emit(("hello",), &mut buffer);
        <(Ascii,)>::emit(("",), &mut buffer);
        let entries: Vec<u32> = buffer.entries().collect();
        assert_eq!(entries, vec![1, 1, 0]);
        assert_eq!(buffer.string_table().len(), 1);
    }
}
