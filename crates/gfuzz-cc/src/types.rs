use bitflags::bitflags;

/// Simplified type category a candidate variable falls into, per strategy 3
/// of the key-variable identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Pointer,
    Integer,
    Other,
}

impl TypeTag {
    pub fn as_manifest_str(self) -> &'static str {
        match self {
            TypeTag::Pointer => "ptr",
            TypeTag::Integer => "int",
            TypeTag::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ptr" => Some(TypeTag::Pointer),
            "int" => Some(TypeTag::Integer),
            "other" => Some(TypeTag::Other),
            _ => None,
        }
    }
}

bitflags! {
    /// Semantic flags attached to a candidate variable by strategy 2. Kept
    /// informational rather than subtractive, per the design notes: a flagged
    /// candidate is never dropped on the strength of this alone.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SemanticFlags: u8 {
        const PARAMETER              = 0b0000_0001;
        const STATIC_GLOBAL          = 0b0000_0010;
        const MEMORY_SAFETY_ADJACENT = 0b0000_0100;
    }
}
