//! An abstract, IR-framework-agnostic whole-program representation.
//!
//! The real instrumentation inserter plugs into whatever IR-transformation
//! framework the host toolchain uses; this crate consumes a flattened summary of
//! it instead, so the analysis itself (the subject of this design) stays
//! decoupled from any one compiler's pass API.

use std::collections::HashMap;

use crate::types::{SemanticFlags, TypeTag};

/// A named storage location read or written inside one function.
#[derive(Debug, Clone)]
pub struct VariableUse {
    pub name: String,
    pub type_tag: TypeTag,
    pub flags: SemanticFlags,
    /// True when `type_tag` is `Pointer` and the pointee is an 8-bit integer,
    /// the recorder-selection hint the instrumentation inserter needs to tell a
    /// C string apart from any other pointer.
    pub is_cstring_pointer: bool,
}

/// One function's relevant facts: who it calls, and which variables it touches.
#[derive(Debug, Clone, Default)]
pub struct FunctionInfo {
    pub calls: Vec<String>,
    pub variables: Vec<VariableUse>,
}

/// The whole-program summary fed to the key-variable identifier.
#[derive(Debug, Clone, Default)]
pub struct ProgramModel {
    pub functions: HashMap<String, FunctionInfo>,
}

impl ProgramModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_function(&mut self, name: impl Into<String>, info: FunctionInfo) {
        self.functions.insert(name.into(), info);
    }

    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }
}

/// Parse the pipe-delimited textual program description the `gfuzz-cc` binaries
/// accept in place of a real compiler front end:
/// `function|callee1,callee2|name:type:flag+flag;name2:type2`
///
/// `type` is one of `ptr`/`int`/`other`; `flags` is a `+`-joined subset of
/// `param`/`static`/`unsafe`. Blank lines and lines starting with `#` are ignored.
pub fn parse_program_description(text: &str) -> ProgramModel {
    let mut program = ProgramModel::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.splitn(3, '|');
        let Some(name) = fields.next() else {
            continue;
        };
        let calls = fields
            .next()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();
        let variables = fields
            .next()
            .unwrap_or_default()
            .split(';')
            .filter_map(parse_variable_use)
            .collect();
        program.add_function(name.trim(), FunctionInfo { calls, variables });
    }
    program
}

fn parse_variable_use(field: &str) -> Option<VariableUse> {
    let field = field.trim();
    if field.is_empty() {
        return None;
    }
    let mut parts = field.splitn(3, ':');
    let name = parts.next()?.trim().to_owned();
    let type_tag = crate::types::TypeTag::parse(parts.next()?.trim())?;
    let mut flags = SemanticFlags::empty();
    let mut is_cstring_pointer = false;
    if let Some(flag_field) = parts.next() {
        for flag in flag_field.split('+').map(str::trim) {
            match flag {
                "param" => flags |= SemanticFlags::PARAMETER,
                "static" => flags |= SemanticFlags::STATIC_GLOBAL,
                "unsafe" => flags |= SemanticFlags::MEMORY_SAFETY_ADJACENT,
                "cstr" => is_cstring_pointer = true,
                _ => {}
            }
        }
    }
    Some(VariableUse {
        name,
        type_tag,
        flags,
        is_cstring_pointer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_calls_and_variables() {
        let text = "target||\nparse|target|len:int:param;buf:ptr:unsafe\n";
        let program = parse_program_description(text);
        assert!(program.functions.contains_key("target"));
        let parse = &program.functions["parse"];
        assert_eq!(parse.calls, vec!["target".to_owned()]);
        assert_eq!(parse.variables.len(), 2);
        assert_eq!(parse.variables[1].name, "buf");
        assert!(parse.variables[1]
            .flags
            .contains(SemanticFlags::MEMORY_SAFETY_ADJACENT));
    }

    #[test]
    fn ignores_blank_and_comment_lines() {
        let text = "# comment\n\ntarget||\n";
        let program = parse_program_description(text);
        assert_eq!(program.functions.len(), 1);
    }
}
