//! Key-variable identification (C2): the three-strategy pipeline, each strategy
//! strictly subtractive over the previous one's survivors.

use rayon::prelude::*;

use gfuzz_core::config::{DISTANCE_THRESHOLD, MAX_KEY_VARS};

use crate::callgraph::distances_from_targets;
use crate::program::ProgramModel;
use crate::types::{SemanticFlags, TypeTag};

/// Tuning knobs beyond the fixed algorithm constants, restored from the original
/// instrumentation header's `GFUZZ_INST_RATIO` / `GFUZZ_CRITICAL_PATH_ONLY`
/// switches. Defaults reproduce the baseline behavior exactly (every surviving
/// candidate kept, full distance threshold).
#[derive(Debug, Clone, Copy)]
pub struct KeyVarIdentifierOptions {
    pub distance_threshold: u32,
    pub max_key_vars: usize,
    /// Percentage (0-100) of surviving candidates to keep, sampled
    /// deterministically by a hash of `(function, name)`.
    pub inst_ratio: u8,
    /// When set, only target functions and their direct callers (distance <= 1)
    /// are considered, regardless of `distance_threshold`.
    pub critical_path_only: bool,
}

impl Default for KeyVarIdentifierOptions {
    fn default() -> Self {
        Self {
            distance_threshold: DISTANCE_THRESHOLD,
            max_key_vars: MAX_KEY_VARS,
            inst_ratio: 100,
            critical_path_only: false,
        }
    }
}

/// One surviving key variable, with its dense `var_id` assigned.
#[derive(Debug, Clone)]
pub struct KeyVariableRecord {
    pub var_id: u32,
    pub function: String,
    pub name: String,
    pub distance: u32,
    pub type_tag: TypeTag,
    pub flags: SemanticFlags,
}

fn djb2(bytes: &[u8]) -> u32 {
    let mut h: u32 = 5381;
    for &b in bytes {
        h = h.wrapping_mul(33).wrapping_add(b as u32);
    }
    h
}

/// Run the full identification pipeline, returning records in stable `var_id`
/// order. Deterministic: identical `(program, targets, options)` always yields
/// byte-identical output.
pub fn identify(
    program: &ProgramModel,
    targets: &[String],
    options: KeyVarIdentifierOptions,
) -> Vec<KeyVariableRecord> {
    if targets.is_empty() {
        tracing::warn!("empty targets list, producing an empty key-variable set");
        return Vec::new();
    }

    let distances = distances_from_targets(program, targets);
    let effective_threshold = if options.critical_path_only {
        1
    } else {
        options.distance_threshold
    };

    let function_names: Vec<&str> = program.function_names().collect();

    // Strategy 1: distance filter, then collect every named storage location in
    // surviving functions as a candidate.
    let mut candidates: Vec<(String, String, u32, TypeTag, SemanticFlags)> = function_names
        .into_par_iter()
        .filter_map(|name| {
            let distance = *distances.get(name)?;
            if distance > effective_threshold {
                return None;
            }
            let info = program.functions.get(name)?;
            Some(
                info.variables
                    .iter()
                    .map(move |v| {
                        (
                            name.to_owned(),
                            v.name.clone(),
                            distance,
                            v.type_tag,
                            v.flags,
                        )
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .flatten()
        .collect();

    // Strategy 2 (memory-safety filter) is informational only here: flags already
    // carry the memory-safety-adjacency classification from the program model's
    // own instruction-level visitor, nothing is dropped on their account.

    // Strategy 3: semantic filter, pointer/integer only.
    candidates.retain(|(_, _, _, type_tag, _)| {
        matches!(type_tag, TypeTag::Pointer | TypeTag::Integer)
    });

    // Deterministic sampling by GFUZZ_INST_RATIO.
    if options.inst_ratio < 100 {
        candidates.retain(|(func, name, _, _, _)| {
            let key = format!("{func}::{name}");
            (djb2(key.as_bytes()) % 100) < options.inst_ratio as u32
        });
    }

    // Sort by (function, name), matching the stable var_id assignment order.
    // The memory-safety flag only breaks ties within identical (function, name)
    // pairs, which cannot occur since a given variable has at most one entry per
    // function; it has no effect on ordering in practice, kept here only so two
    // otherwise-identical records never depend on sort stability alone.
    candidates.sort_by(|a, b| {
        a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)).then_with(|| {
            b.4.contains(SemanticFlags::MEMORY_SAFETY_ADJACENT)
                .cmp(&a.4.contains(SemanticFlags::MEMORY_SAFETY_ADJACENT))
        })
    });
    candidates.truncate(options.max_key_vars);

    candidates
        .into_iter()
        .enumerate()
        .map(
            |(var_id, (function, name, distance, type_tag, flags))| KeyVariableRecord {
                var_id: var_id as u32,
                function,
                name,
                distance,
                type_tag,
                flags,
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{FunctionInfo, VariableUse};

    fn sample_program() -> ProgramModel {
        let mut program = ProgramModel::new();
        program.add_function(
            "parse",
            FunctionInfo {
                calls: vec!["target".into()],
                variables: vec![
                    VariableUse {
                        name: "len".into(),
                        type_tag: TypeTag::Integer,
                        flags: SemanticFlags::PARAMETER,
                        is_cstring_pointer: false,
                    },
                    VariableUse {
                        name: "ratio".into(),
                        type_tag: TypeTag::Other,
                        flags: SemanticFlags::empty(),
                        is_cstring_pointer: false,
                    },
                ],
            },
        );
        program.add_function("target", FunctionInfo::default());
        program.add_function(
            "unrelated",
            FunctionInfo {
                calls: vec![],
                variables: vec![VariableUse {
                    name: "x".into(),
                    type_tag: TypeTag::Integer,
                    flags: SemanticFlags::empty(),
                    is_cstring_pointer: false,
                }],
            },
        );
        program
    }

    #[test]
    fn semantic_filter_drops_non_pointer_int() {
        let program = sample_program();
        let records = identify(
            &program,
            &["target".to_owned()],
            KeyVarIdentifierOptions::default(),
        );
        assert!(records.iter().any(|r| r.name == "len"));
        assert!(!records.iter().any(|r| r.name == "ratio"));
    }

    #[test]
    fn distance_filter_drops_unreachable_functions() {
        let program = sample_program();
        let records = identify(
            &program,
            &["target".to_owned()],
            KeyVarIdentifierOptions::default(),
        );
        assert!(!records.iter().any(|r| r.function == "unrelated"));
    }

    #[test]
    fn empty_targets_yields_empty_manifest() {
        let program = sample_program();
        let records = identify(&program, &[], KeyVarIdentifierOptions::default());
        assert!(records.is_empty());
    }

    #[test]
    fn identification_is_deterministic() {
        let program = sample_program();
        let a = identify(
            &program,
            &["target".to_owned()],
            KeyVarIdentifierOptions::default(),
        );
        let b = identify(
            &program,
            &["target".to_owned()],
            KeyVarIdentifierOptions::default(),
        );
        let names_a: Vec<_> = a.iter().map(|r| (r.function.clone(), r.var_id)).collect();
        let names_b: Vec<_> = b.iter().map(|r| (r.function.clone(), r.var_id)).collect();
        assert_eq!(names_a, names_b);
    }
}
