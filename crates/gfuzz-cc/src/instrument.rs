//! Instrumentation decision logic (C3): normalization rules and recorder
//! selection for a value observed at IR level, decoupled from any specific IR
//! framework's instruction types.

/// The minimal type facts the instrumentation decision needs about a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Integer { width: u32 },
    Pointer { pointee_is_int8: bool },
    Float32,
    Float64,
    Other,
}

/// Which runtime recorder a call site should be rewritten to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderKind {
    Numeric,
    Char,
    String,
    Pointer,
}

/// A normalization step to apply to the value before passing it to the chosen
/// recorder, mirroring the IR-level casts the original instrumentation inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    Unchanged,
    ZeroExtendTo32,
    TruncateTo32,
    PtrToIntThenTruncate,
    BitcastThenUnchanged,
    BitcastThenTruncate,
    ConstantZero,
}

/// Decide the recorder and the value normalization for one instrumented value.
pub fn plan_for(value_type: ValueType) -> (RecorderKind, Normalization) {
    let recorder = match value_type {
        ValueType::Pointer {
            pointee_is_int8: true,
        } => RecorderKind::String,
        ValueType::Pointer { .. } => RecorderKind::Pointer,
        ValueType::Integer { width: 8 } => RecorderKind::Char,
        _ => RecorderKind::Numeric,
    };

    let normalization = match value_type {
        ValueType::Integer { width: 32 } => Normalization::Unchanged,
        ValueType::Integer { width } if width < 32 => Normalization::ZeroExtendTo32,
        ValueType::Integer { width } if width > 32 => Normalization::TruncateTo32,
        ValueType::Pointer { .. } => Normalization::PtrToIntThenTruncate,
        ValueType::Float32 => Normalization::BitcastThenUnchanged,
        ValueType::Float64 => Normalization::BitcastThenTruncate,
        _ => Normalization::ConstantZero,
    };

    (recorder, normalization)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_recorder_for_pointer_to_int8() {
        let (recorder, _) = plan_for(ValueType::Pointer {
            pointee_is_int8: true,
        });
        assert_eq!(recorder, RecorderKind::String);
    }

    #[test]
    fn pointer_recorder_for_other_pointers() {
        let (recorder, norm) = plan_for(ValueType::Pointer {
            pointee_is_int8: false,
        });
        assert_eq!(recorder, RecorderKind::Pointer);
        assert_eq!(norm, Normalization::PtrToIntThenTruncate);
    }

    #[test]
    fn char_recorder_for_8_bit_integers() {
        let (recorder, _) = plan_for(ValueType::Integer { width: 8 });
        assert_eq!(recorder, RecorderKind::Char);
    }

    #[test]
    fn narrow_integers_are_zero_extended() {
        let (recorder, norm) = plan_for(ValueType::Integer { width: 16 });
        assert_eq!(recorder, RecorderKind::Numeric);
        assert_eq!(norm, Normalization::ZeroExtendTo32);
    }

    #[test]
    fn wide_integers_are_truncated() {
        let (_, norm) = plan_for(ValueType::Integer { width: 64 });
        assert_eq!(norm, Normalization::TruncateTo32);
    }

    #[test]
    fn unsupported_types_fall_back_to_constant_zero() {
        let (recorder, norm) = plan_for(ValueType::Other);
        assert_eq!(recorder, RecorderKind::Numeric);
        assert_eq!(norm, Normalization::ConstantZero);
    }
}
