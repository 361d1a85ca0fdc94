//! File formats exchanged between build time and run time: the targets file,
//! the key-variable manifest, and the optional var-id debug mapping.

use std::fs;
use std::path::Path;

use crate::error::KeyVarError;
use crate::identifier::KeyVariableRecord;
use crate::types::TypeTag;

/// Read the targets file: one fully qualified function name per line, blank
/// lines ignored.
pub fn read_targets(path: &Path) -> Result<Vec<String>, KeyVarError> {
    let contents = fs::read_to_string(path).map_err(|source| KeyVarError::ReadTargets {
        path: path.display().to_string(),
        source,
    })?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_owned)
        .collect())
}

/// Serialize key-variable records to the manifest text format:
/// `function,variable,distance,type` per line.
pub fn write_manifest(path: &Path, records: &[KeyVariableRecord]) -> Result<(), KeyVarError> {
    let mut out = String::new();
    for r in records {
        out.push_str(&format!(
            "{},{},{},{}\n",
            r.function,
            r.name,
            r.distance,
            r.type_tag.as_manifest_str()
        ));
    }
    fs::write(path, out).map_err(|source| KeyVarError::WriteManifest {
        path: path.display().to_string(),
        source,
    })
}

/// One parsed manifest entry, without the `var_id` (assigned by reading order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub function: String,
    pub name: String,
    pub distance: u32,
    pub type_tag: TypeTag,
}

/// Parse the manifest, skipping and warning on malformed lines rather than
/// failing the whole read.
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>, KeyVarError> {
    let contents = fs::read_to_string(path).map_err(|source| KeyVarError::ReadManifest {
        path: path.display().to_string(),
        source,
    })?;
    let mut entries = Vec::new();
    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_manifest_line(line) {
            Some(entry) => entries.push(entry),
            None => tracing::warn!(line = lineno + 1, content = line, "skipping malformed manifest line"),
        }
    }
    Ok(entries)
}

fn parse_manifest_line(line: &str) -> Option<ManifestEntry> {
    let mut parts = line.splitn(4, ',');
    let function = parts.next()?.to_owned();
    let name = parts.next()?.to_owned();
    let distance: u32 = parts.next()?.parse().ok()?;
    let type_tag = TypeTag::parse(parts.next()?)?;
    Some(ManifestEntry {
        function,
        name,
        distance,
        type_tag,
    })
}

/// Write the optional `id,function::name` debug mapping.
pub fn write_var_id_map(path: &Path, records: &[KeyVariableRecord]) -> Result<(), KeyVarError> {
    let mut out = String::new();
    for r in records {
        out.push_str(&format!("{},{}::{}\n", r.var_id, r.function, r.name));
    }
    fs::write(path, out).map_err(|source| KeyVarError::WriteManifest {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn targets_round_trip_ignores_blank_lines() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "foo\n\nbar\n  \nbaz\n").unwrap();
        let targets = read_targets(file.path()).unwrap();
        assert_eq!(targets, vec!["foo", "bar", "baz"]);
    }

    #[test]
    fn manifest_round_trips_through_write_and_read() {
        let records = vec![KeyVariableRecord {
            var_id: 0,
            function: "parse".into(),
            name: "len".into(),
            distance: 1,
            type_tag: TypeTag::Integer,
            flags: crate::types::SemanticFlags::empty(),
        }];
        let file = NamedTempFile::new().unwrap();
        write_manifest(file.path(), &records).unwrap();
        let entries = read_manifest(file.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].function, "parse");
        assert_eq!(entries[0].type_tag, TypeTag::Integer);
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "parse,len,1,int\nnot-enough-fields\nfoo,bar,NOTANUMBER,int\n").unwrap();
        let entries = read_manifest(file.path()).unwrap();
        assert_eq!(entries.len(), 1);
    }
}
