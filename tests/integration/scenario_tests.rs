//! End-to-end defect-detection scenarios through the filesystem: fixture
//! trees are written to a temp dir, discovered by the scanner, parsed,
//! merged, and analyzed.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use leakcheck::analysis::analyze_classes;
use leakcheck::parse::parser::parse_source;
use leakcheck::parse::registry::ClassRegistry;
use leakcheck::parse::{Leak, Severity};
use leakcheck::scanner::Scanner;

/// Write the named fixtures, scan the tree, and run the full pipeline.
fn analyze_tree(files: &[(&str, &str)]) -> Vec<Leak> {
    let tmp = TempDir::new().unwrap();
    for (name, content) in files {
        let path = tmp.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    let scanner = Scanner::new(vec![]);
    let found = scanner.scan_paths(&[tmp.path().to_path_buf()]).unwrap();
    assert_eq!(found.len(), files.len(), "scanner missed fixtures");

    let mut registry = ClassRegistry::new();
    for file in &found {
        let content = fs::read_to_string(file).unwrap();
        registry.add_classes(parse_source(&file.to_string_lossy(), &content));
    }
    analyze_classes(registry.merge_classes())
}

fn analyze_one(content: &str) -> Vec<Leak> {
    analyze_tree(&[("sample.cpp", content)])
}

#[test]
fn test_scenario_basic_leak() {
    let leaks = analyze_one(
        r#"
class BasicLeak {
    int* ptr;
public:
    BasicLeak() { ptr = new int(42); }
    ~BasicLeak() { }
};
"#,
    );
    assert_eq!(leaks.len(), 1);
    assert_eq!(leaks[0].class_name, "BasicLeak");
    assert_eq!(leaks[0].variable, "ptr");
    assert_eq!(leaks[0].severity, Severity::Error);
    assert!(leaks[0].reason.contains("not deleted"));
}

#[test]
fn test_scenario_array_mismatch_error() {
    let leaks = analyze_one(
        r#"
class ArrayMismatch {
    int* arr;
public:
    ArrayMismatch() { arr = new int[50]; }
    ~ArrayMismatch() { delete arr; }
};
"#,
    );
    assert_eq!(leaks.len(), 1);
    assert_eq!(leaks[0].severity, Severity::Error);
    assert!(leaks[0].reason.contains("'new[]' but deleted with 'delete'"));
}

#[test]
fn test_scenario_scalar_with_array_delete_warns() {
    let leaks = analyze_one(
        r#"
class ScalarMismatch {
    int* single;
public:
    ScalarMismatch() { single = new int(10); }
    ~ScalarMismatch() { delete[] single; }
};
"#,
    );
    assert_eq!(leaks.len(), 1);
    assert_eq!(leaks[0].severity, Severity::Warning);
    assert!(leaks[0].reason.contains("'new' but deleted with 'delete[]'"));
}

#[test]
fn test_scenario_four_level_cleanup_chain() {
    let leaks = analyze_one(
        r#"
class ThreadPool {
    int* queues;
    int* threads;
    int* stats;
public:
    ThreadPool() {
        queues = new int[4];
        threads = new int[8];
        stats = new int(0);
    }
    ~ThreadPool() { shutdown(); }
    void shutdown() { releaseAll(); }
    void releaseAll() {
        releaseQueues();
        releaseThreads();
    }
    void releaseQueues() {
        delete[] queues;
        delete stats;
    }
    void releaseThreads() { delete[] threads; }
};
"#,
    );
    assert!(leaks.is_empty(), "deep cleanup chain must resolve: {leaks:?}");
}

#[test]
fn test_scenario_depth_six_chain_is_reported() {
    let leaks = analyze_one(
        r#"
class TooDeep {
    int* p;
public:
    TooDeep() { p = new int(1); }
    ~TooDeep() { l1(); }
    void l1() { l2(); }
    void l2() { l3(); }
    void l3() { l4(); }
    void l4() { l5(); }
    void l5() { l6(); }
    void l6() { delete p; }
};
"#,
    );
    assert_eq!(leaks.len(), 1, "depth cap must cut the chain: {leaks:?}");
    assert!(leaks[0].reason.contains("not deleted"));
}

#[test]
fn test_scenario_double_free_via_alias() {
    let leaks = analyze_one(
        r#"
class AliasedFree {
    int* original;
public:
    AliasedFree() { original = new int(7); }
    ~AliasedFree() { delete original; }
    void drop() {
        int* alias = original;
        delete alias;
        delete original;
    }
};
"#,
    );
    assert_eq!(leaks.len(), 1);
    assert_eq!(leaks[0].severity, Severity::Error);
    assert_eq!(leaks[0].variable, "original");
    assert!(leaks[0].reason.contains("potential double-free"));
}

#[test]
fn test_scenario_no_destructor() {
    let leaks = analyze_one(
        r#"
class Orphaned {
    int* leaked;
public:
    Orphaned() { leaked = new int[100]; }
};
"#,
    );
    assert_eq!(leaks.len(), 1);
    assert_eq!(leaks[0].severity, Severity::Error);
    assert!(leaks[0].reason.contains("no destructor"));
    assert_eq!(leaks[0].line, 3, "must point at the member declaration");
}

#[test]
fn test_scenario_reassignment_in_method() {
    let leaks = analyze_one(
        r#"
class Refresher {
    int* ptr;
public:
    Refresher() { ptr = new int(1); }
    ~Refresher() { delete ptr; }
    void refresh() { ptr = new int(2); }
};
"#,
    );
    assert_eq!(leaks.len(), 1, "exactly one rule-2 warning: {leaks:?}");
    assert_eq!(leaks[0].severity, Severity::Warning);
    assert!(leaks[0].reason.contains("reassigned"));
    assert!(leaks[0].reason.contains("(in refresh)"));
}

#[test]
fn test_scenario_delete_then_reassign_is_clean() {
    let leaks = analyze_one(
        r#"
class Careful {
    int* ptr;
public:
    Careful() { ptr = new int(1); }
    ~Careful() { delete ptr; }
    void refresh() {
        delete ptr;
        ptr = new int(2);
    }
};
"#,
    );
    assert!(leaks.is_empty(), "{leaks:?}");
}

#[test]
fn test_scenario_cross_file_merge() {
    let leaks = analyze_tree(&[
        (
            "data_manager.h",
            r#"
class DataManager {
    int* buffer;
    char* name;
public:
    DataManager();
    ~DataManager();
};
"#,
        ),
        (
            "data_manager.cpp",
            r#"
DataManager::DataManager() {
    buffer = new int[100];
    name = new char[50];
}

DataManager::~DataManager() {
    delete[] buffer;
}
"#,
        ),
    ]);
    assert_eq!(leaks.len(), 1, "{leaks:?}");
    assert_eq!(leaks[0].class_name, "DataManager");
    assert_eq!(leaks[0].variable, "name");
    assert!(leaks[0].reason.contains("not deleted"));
}

#[test]
fn test_scenario_alias_discharges_in_both_directions() {
    // Destructor frees through a local alias; the member's obligation is
    // discharged by the undirected alias relation.
    let leaks = analyze_one(
        r#"
class Indirect {
    int* data;
public:
    Indirect() { data = new int(3); }
    ~Indirect() {
        int* handle = data;
        delete handle;
    }
};
"#,
    );
    assert!(leaks.is_empty(), "{leaks:?}");
}

#[test]
fn test_scenario_classes_without_pointers_are_silent() {
    let leaks = analyze_one(
        r#"
class PlainValue {
    int count;
    double ratio;
public:
    PlainValue() { count = 0; }
};
"#,
    );
    assert!(leaks.is_empty());
}

#[test]
fn test_scenario_multiple_files_multiple_classes() {
    let leaks = analyze_tree(&[
        (
            "a.cpp",
            r#"
class LeakA {
    int* pa;
public:
    LeakA() { pa = new int(1); }
    ~LeakA() { }
};
"#,
        ),
        (
            "b.cpp",
            r#"
class CleanB {
    int* pb;
public:
    CleanB() { pb = new int(2); }
    ~CleanB() { delete pb; }
};
"#,
        ),
    ]);
    assert_eq!(leaks.len(), 1);
    assert_eq!(leaks[0].class_name, "LeakA");
}

#[test]
fn test_scenario_excluded_directory_is_not_scanned() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("third_party")).unwrap();
    fs::write(
        tmp.path().join("third_party/dep.cpp"),
        "class Dep { int* p; public: Dep() { p = new int(1); } };",
    )
    .unwrap();
    fs::write(tmp.path().join("main.cpp"), "class Ok { int x; };").unwrap();

    let scanner = Scanner::new(vec!["third_party".to_string()]);
    let found = scanner.scan_paths(&[tmp.path().to_path_buf()]).unwrap();
    assert_eq!(found.len(), 1);
    assert!(found[0].ends_with("main.cpp"));
}

#[test]
fn test_scenario_unreadable_garbage_degrades_gracefully() {
    // Preprocessor noise, templates, and an unterminated comment must not
    // prevent detection in the well-formed class that precedes them.
    let leaks = analyze_one(
        r#"
#include <memory>
#define MAKE(T) new T()

class StillFound {
    int* p;
public:
    StillFound() { p = new int(1); }
    ~StillFound() { }
};

template <typename T>
struct Wrapper {
    T* inner;
};

/* unterminated trailing comment
"#,
    );
    assert_eq!(leaks.len(), 1);
    assert_eq!(leaks[0].class_name, "StillFound");
}

#[test]
fn test_scenario_file_paths_are_absolute() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("x.cpp"), "class X { int* p; };").unwrap();
    let scanner = Scanner::new(vec![]);
    let found = scanner
        .scan_paths(&[PathBuf::from(tmp.path())])
        .unwrap();
    assert!(found.iter().all(|p| p.is_absolute()));
}
