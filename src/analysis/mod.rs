//! Leak analysis over merged class records.
//!
//! Four rules per class:
//!
//! 1. Constructor allocation never released along the destructor's
//!    transitive call chain, or released with mismatched `new`/`new[]`
//!    arity.
//! 2. A method re-assigns an already-allocated pointer member with `new`
//!    without a prior `delete` in the same method.
//! 3. A pointer member and a local alias of it are both deleted inside one
//!    function body (potential double-free).
//! 4. A class allocates a pointer member but declares no destructor at all.
//!
//! Destructor reachability is computed by a bounded traversal of the
//! intra-class call graph; alias edges are treated symmetrically so that a
//! release through either name discharges the obligation on both.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::parse::{Allocation, Class, Deallocation, Function, Leak, Severity};

/// Maximum depth of method calls followed from the destructor. The cap is
/// observable: a deallocation buried deeper than this is reported as a leak.
pub const MAX_METHOD_DEPTH: usize = 5;

/// Detects memory defects in parsed C++ classes.
#[derive(Debug, Default)]
pub struct Analyzer {
    classes: Vec<Class>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_classes(&mut self, classes: Vec<Class>) {
        self.classes.extend(classes);
    }

    /// Run all rules over every class. Emission order within a class is
    /// rule 1, 2, 3, 4; classes follow registry order.
    pub fn analyze(&self) -> Vec<Leak> {
        let mut leaks = Vec::new();
        for class in &self.classes {
            analyze_class(class, &mut leaks);
        }
        leaks
    }
}

/// Analyze a set of classes in one call.
pub fn analyze_classes(classes: Vec<Class>) -> Vec<Leak> {
    let mut analyzer = Analyzer::new();
    analyzer.add_classes(classes);
    analyzer.analyze()
}

fn analyze_class(class: &Class, leaks: &mut Vec<Leak>) {
    let pointer_members: FxHashSet<&str> = class
        .members
        .iter()
        .filter(|m| m.is_pointer)
        .map(|m| m.name.as_str())
        .collect();
    if pointer_members.is_empty() {
        return;
    }

    // Constructor allocations; later ones shadow earlier ones, first-seen
    // order is kept for stable emission.
    let mut allocated_order: Vec<&str> = Vec::new();
    let mut allocated: FxHashMap<&str, &Allocation> = FxHashMap::default();
    if let Some(ctor) = &class.constructor {
        for alloc in &ctor.allocations {
            if allocated.insert(alloc.var.as_str(), alloc).is_none() {
                allocated_order.push(alloc.var.as_str());
            }
        }
    }

    let method_index: FxHashMap<&str, &Function> = class
        .methods
        .iter()
        .map(|m| (m.name.as_str(), m))
        .collect();

    // Everything the destructor releases, directly or through up to
    // MAX_METHOD_DEPTH levels of method calls.
    let mut deallocated: FxHashMap<&str, &Deallocation> = FxHashMap::default();
    if let Some(dtor) = &class.destructor {
        let mut visited = FxHashSet::default();
        collect_deallocations(
            dtor,
            &method_index,
            &mut deallocated,
            MAX_METHOD_DEPTH,
            &mut visited,
        );
    }

    let alias_map = build_alias_map(class);

    let leak = |line: usize, var: &str, reason: String, severity: Severity| Leak {
        file: class.file.clone(),
        line,
        class_name: class.name.clone(),
        variable: var.to_string(),
        reason,
        severity,
    };

    // Rule 1: allocated in the constructor but never released, or released
    // with the wrong arity.
    for var in &allocated_order {
        let alloc = allocated[var];
        match find_deallocation(var, &deallocated, &alias_map) {
            None => leaks.push(leak(
                alloc.line,
                var,
                "allocated with 'new' but not deleted in destructor".to_string(),
                Severity::Error,
            )),
            Some(dealloc) => {
                if alloc.is_array && !dealloc.is_array {
                    leaks.push(leak(
                        dealloc.line,
                        var,
                        "allocated with 'new[]' but deleted with 'delete' instead of 'delete[]'"
                            .to_string(),
                        Severity::Error,
                    ));
                } else if !alloc.is_array && dealloc.is_array {
                    leaks.push(leak(
                        dealloc.line,
                        var,
                        "allocated with 'new' but deleted with 'delete[]' instead of 'delete'"
                            .to_string(),
                        Severity::Warning,
                    ));
                }
            }
        }
    }

    // Rule 2: re-assignment with 'new' without a prior delete in the same
    // method. Line comparison only; the analysis is intentionally
    // flow-insensitive.
    for method in &class.methods {
        for alloc in &method.allocations {
            if !pointer_members.contains(alloc.var.as_str()) {
                continue;
            }
            let deleted_before = method
                .deallocations
                .iter()
                .any(|d| d.var == alloc.var && d.line < alloc.line);
            if !deleted_before && allocated.contains_key(alloc.var.as_str()) {
                leaks.push(leak(
                    alloc.line,
                    &alloc.var,
                    format!(
                        "pointer reassigned with 'new' without deleting previous allocation (in {})",
                        method.name
                    ),
                    Severity::Warning,
                ));
            }
        }
    }

    // Rule 3: a member and its alias both deleted in one function body.
    for method in &class.methods {
        for alias in &method.aliases {
            if !pointer_members.contains(alias.source.as_str()) {
                continue;
            }
            let source_deleted = method.deallocations.iter().any(|d| d.var == alias.source);
            let target_deleted = method.deallocations.iter().any(|d| d.var == alias.target);
            if source_deleted && target_deleted {
                leaks.push(leak(
                    alias.line,
                    &alias.source,
                    format!(
                        "pointer aliased to '{}' and both are deleted (potential double-free)",
                        alias.target
                    ),
                    Severity::Error,
                ));
            }
        }
    }

    // Rule 4: allocations with no destructor at all.
    if class.destructor.is_none() {
        for member in class.members.iter().filter(|m| m.is_pointer) {
            if allocated.contains_key(member.name.as_str()) {
                leaks.push(leak(
                    member.line,
                    &member.name,
                    "pointer member allocated but class has no destructor".to_string(),
                    Severity::Error,
                ));
            }
        }
    }
}

/// Collect deallocations reachable from `func` through at most `depth`
/// levels of intra-class method calls. The visited set is shared across
/// siblings, so each method contributes at most once per traversal.
fn collect_deallocations<'a>(
    func: &'a Function,
    method_index: &FxHashMap<&'a str, &'a Function>,
    result: &mut FxHashMap<&'a str, &'a Deallocation>,
    depth: usize,
    visited: &mut FxHashSet<&'a str>,
) {
    if depth == 0 || !visited.insert(func.name.as_str()) {
        return;
    }

    for dealloc in &func.deallocations {
        result.insert(dealloc.var.as_str(), dealloc);
    }

    for call in &func.calls {
        if let Some(method) = method_index.get(call.as_str()) {
            collect_deallocations(method, method_index, result, depth - 1, visited);
        }
    }
}

/// Undirected alias adjacency over every function in the class: deleting
/// either end of an alias edge discharges the obligation on the other.
fn build_alias_map(class: &Class) -> FxHashMap<&str, Vec<&str>> {
    let mut map: FxHashMap<&str, Vec<&str>> = FxHashMap::default();
    let functions = class
        .constructor
        .iter()
        .chain(class.destructor.iter())
        .chain(class.methods.iter());
    for func in functions {
        for alias in &func.aliases {
            map.entry(alias.source.as_str())
                .or_default()
                .push(alias.target.as_str());
            map.entry(alias.target.as_str())
                .or_default()
                .push(alias.source.as_str());
        }
    }
    map
}

/// The deallocation discharging `var`: a direct hit, or the first aliased
/// name that was released.
fn find_deallocation<'a>(
    var: &str,
    deallocated: &FxHashMap<&'a str, &'a Deallocation>,
    alias_map: &FxHashMap<&str, Vec<&str>>,
) -> Option<&'a Deallocation> {
    if let Some(dealloc) = deallocated.get(var).copied() {
        return Some(dealloc);
    }
    for alias in alias_map.get(var).into_iter().flatten() {
        if let Some(dealloc) = deallocated.get(alias).copied() {
            return Some(dealloc);
        }
    }
    None
}
