//! Call-graph hop-distance computation for strategy 1 of the key-variable
//! identifier.
//!
//! This performs a proper multi-hop BFS on the reversed call graph, rather than
//! the distance-1-direct-callers-only shortcut the original LLVM pass took.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::program::ProgramModel;

/// Hop distances from every function to the nearest target, computed on the
/// reversed call graph (targets are distance 0; callers of targets are distance
/// 1; and so on). Functions unreachable from any target are absent from the map.
pub fn distances_from_targets(program: &ProgramModel, targets: &[String]) -> HashMap<String, u32> {
    let mut reverse_edges: HashMap<&str, Vec<&str>> = HashMap::new();
    for (caller, info) in &program.functions {
        for callee in &info.calls {
            reverse_edges
                .entry(callee.as_str())
                .or_default()
                .push(caller.as_str());
        }
    }

    let mut distances = HashMap::new();
    let mut queue = VecDeque::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for target in targets {
        if seen.insert(target.as_str()) {
            distances.insert(target.clone(), 0);
            queue.push_back((target.as_str(), 0u32));
        }
    }

    while let Some((func, dist)) = queue.pop_front() {
        let Some(callers) = reverse_edges.get(func) else {
            continue;
        };
        for &caller in callers {
            if seen.insert(caller) {
                distances.insert(caller.to_owned(), dist + 1);
                queue.push_back((caller, dist + 1));
            }
        }
    }

    distances
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::FunctionInfo;

    fn chain_program() -> ProgramModel {
        // a -> b -> c -> target, plus an unrelated function `d`.
        let mut program = ProgramModel::new();
        program.add_function(
            "a",
            FunctionInfo {
                calls: vec!["b".into()],
                variables: vec![],
            },
        );
        program.add_function(
            "b",
            FunctionInfo {
                calls: vec!["c".into()],
                variables: vec![],
            },
        );
        program.add_function(
            "c",
            FunctionInfo {
                calls: vec!["target".into()],
                variables: vec![],
            },
        );
        program.add_function("target", FunctionInfo::default());
        program.add_function("d", FunctionInfo::default());
        program
    }

    #[test]
    fn distances_grow_with_hop_count() {
        let program = chain_program();
        let distances = distances_from_targets(&program, &["target".to_owned()]);
        assert_eq!(distances["target"], 0);
        assert_eq!(distances["c"], 1);
        assert_eq!(distances["b"], 2);
        assert_eq!(distances["a"], 3);
        assert!(!distances.contains_key("d"));
    }
}
