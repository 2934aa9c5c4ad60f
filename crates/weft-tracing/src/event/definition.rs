use crate::event::args::EventArgs;

/// Whether an event marks a single instant or brackets a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventClass {
    Instance = 0,
    Scoped = 1,
}

/// Flags carried on event definitions. Only the bits builtin events use are
/// named; the rest of the field is reserved.
pub mod flags {
    pub const INTERNAL: u32 = 1 << 3;
    pub const BUILTIN: u32 = 1 << 5;
}

/// The registered schema of one event: wire id, class, flags, the name spec
/// it was declared with, and a materializer that can rebuild the canonical
/// argument signature from the declared type list.
///
/// A name spec reads `Namespace#Method: arg1, arg2` or just
/// `Namespace#Method`. The part before the colon is the event name, verbatim.
/// The part after it names the arguments; missing or blank names are
/// synthesized from the argument index and excess names are ignored, so a
/// name spec can never fail to parse.
#[derive(Debug, Clone, Copy)]
pub struct EventDefinition {
    wire_id: u32,
    event_class: EventClass,
    flags: u32,
    name_spec: &'static str,
    // Monomorphized from the declaration's type list; the only piece of the
    // typed event that survives type erasure into the registry.
    append_args: fn(&mut String, &str),
}

impl EventDefinition {
    pub fn new<Args: EventArgs>(
        wire_id: u32,
        event_class: EventClass,
        flags: u32,
        name_spec: &'static str,
    ) -> Self {
        Self {
            wire_id,
            event_class,
            flags,
            name_spec,
            append_args: Args::append_signature,
        }
    }

    /// Appends the event name, the name-spec text before any colon.
    pub fn append_name(&self, out: &mut String) {
        match self.name_spec.find(':') {
            Some(colon) => out.push_str(&self.name_spec[..colon]),
            None => out.push_str(self.name_spec),
        }
    }

    /// Appends the canonical typed argument signature.
    pub fn append_arguments(&self, out: &mut String) {
        let arg_names = match self.name_spec.find(':') {
            Some(colon) => &self.name_spec[colon + 1..],
            None => "",
        };
        (self.append_args)(out, arg_names);
    }

    /// Allocating shortcut around [`Self::append_name`].
    pub fn name(&self) -> String {
        let mut out = String::new();
        self.append_name(&mut out);
        out
    }

    /// Allocating shortcut around [`Self::append_arguments`].
    pub fn arguments(&self) -> String {
        let mut out = String::new();
        self.append_arguments(&mut out);
        out
    }

    pub fn wire_id(&self) -> u32 {
        self.wire_id
    }

    pub fn event_class(&self) -> EventClass {
        self.event_class
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::args::{Ascii, Int32};

    fn definition<Args: EventArgs>(name_spec: &'static str) -> EventDefinition {
        EventDefinition::new::<Args>(100, EventClass::Instance, 0, name_spec)
    }

    #[test]
    fn test_name_is_verbatim_before_colon() {
        assert_eq!(definition::<()>("A#B").name(), "A#B");
        assert_eq!(definition::<(Int32,)>("A#B: x").name(), "A#B");
    }

    #[test]
    fn test_arguments_without_names() {
        let definition = definition::<(Int32, Int32)>("A#B");
        assert_eq!(definition.arguments(), "int32 arg0, int32 arg1");
    }

    #[test]
    fn test_arguments_with_partial_names() {
        let definition = definition::<(Int32, Int32)>("A#B: x");
        assert_eq!(definition.arguments(), "int32 x, int32 arg1");
    }

    #[test]
    fn test_arguments_strip_whitespace() {
        let definition = definition::<(Int32, Ascii)>("A#B:  x ,  s ");
        assert_eq!(definition.arguments(), "int32 x, ascii s");
    }

    #[test]
    fn test_signature_rebuilds_name_spec() {
        // Name plus signature reproduces the declaration, modulo types and
        // synthesized names.
        let definition = definition::<(Int32, Ascii)>("Frames#draw: count, label");
        assert_eq!(definition.name(), "Frames#draw");
        assert_eq!(definition.arguments(), "int32 count, ascii label");
    }
}
