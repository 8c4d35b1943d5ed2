//! Cross-file class registry.
//!
//! The parser sees one file at a time, so a class split across a header and
//! an implementation file arrives as separate fragments. The registry
//! accumulates every fragment and merges the ones sharing a class name into
//! one canonical record, preferring header member lists and function bodies
//! that actually allocate or deallocate.

use std::collections::hash_map::Entry;
use std::path::Path;

use rustc_hash::FxHashMap;

use super::types::Class;

/// Accumulates class records across files and merges them by name.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: Vec<Class>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one file's parsed classes. Call in input-file order: merge
    /// tie-breaks depend on arrival order, and keeping it deterministic
    /// keeps the report reproducible.
    pub fn add_classes(&mut self, classes: Vec<Class>) {
        self.classes.extend(classes);
    }

    /// Produce one canonical record per class name, in first-seen order.
    pub fn merge_classes(self) -> Vec<Class> {
        let mut order: Vec<String> = Vec::new();
        let mut merged: FxHashMap<String, Class> = FxHashMap::default();

        for class in self.classes {
            match merged.entry(class.name.clone()) {
                Entry::Occupied(mut existing) => merge_class_into(existing.get_mut(), class),
                Entry::Vacant(slot) => {
                    order.push(class.name.clone());
                    slot.insert(class);
                }
            }
        }

        order
            .into_iter()
            .filter_map(|name| merged.remove(&name))
            .collect()
    }
}

/// Merge `source` into `target` (the record seen first).
fn merge_class_into(target: &mut Class, source: Class) {
    let target_is_header = is_header_file(&target.file);
    let source_is_header = is_header_file(&source.file);

    // Members: the header's declarations win. Implementation files normally
    // do not repeat them.
    if source_is_header && !target_is_header {
        target.members = source.members;
    } else if target_is_header && !source_is_header {
        // Target already holds the header's members.
    } else if target.members.is_empty() && !source.members.is_empty() {
        target.members = source.members;
    }

    // Constructor: prefer the fragment with allocations (the implementation
    // over the declaration).
    if target.constructor.is_none() {
        target.constructor = source.constructor;
    } else if let (Some(held), Some(incoming)) =
        (target.constructor.as_mut(), source.constructor)
    {
        if !incoming.allocations.is_empty() && held.allocations.is_empty() {
            *held = incoming;
        }
    }

    // Destructor: symmetric, keyed on deallocations.
    if target.destructor.is_none() {
        target.destructor = source.destructor;
    } else if let (Some(held), Some(incoming)) =
        (target.destructor.as_mut(), source.destructor)
    {
        if !incoming.deallocations.is_empty() && held.deallocations.is_empty() {
            *held = incoming;
        }
    }

    // Methods: new names append; an incoming body with allocations or
    // deallocations replaces an emptier record of the same name.
    let mut index: FxHashMap<String, usize> = target
        .methods
        .iter()
        .enumerate()
        .map(|(i, m)| (m.name.clone(), i))
        .collect();
    for method in source.methods {
        match index.get(&method.name).copied() {
            None => {
                index.insert(method.name.clone(), target.methods.len());
                target.methods.push(method);
            }
            Some(i) => {
                if !method.allocations.is_empty() || !method.deallocations.is_empty() {
                    target.methods[i] = method;
                }
            }
        }
    }

    // File attribution is display-only: record every contributing file.
    if target.file != source.file && !target.file.contains(&source.file) {
        let base = Path::new(&source.file)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&source.file);
        target.file = format!("{}, {}", target.file, base);
    }
}

fn is_header_file(file: &str) -> bool {
    matches!(
        Path::new(file)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("h" | "hpp" | "hxx")
    )
}
