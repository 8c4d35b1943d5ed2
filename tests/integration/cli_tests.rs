//! CLI argument validation via `Cli::try_parse_from` -- no subprocess
//! required.

use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;

use leakcheck::cli::{parse_excludes, Cli};

#[test]
fn test_positional_paths() {
    let cli = Cli::try_parse_from(["leakcheck", "src", "include"]).unwrap();
    assert_eq!(
        cli.paths,
        [PathBuf::from("src"), PathBuf::from("include")]
    );
    assert!(!cli.json);
    assert!(cli.exclude.is_none());
}

#[test]
fn test_exclude_equals_syntax() {
    let cli = Cli::try_parse_from(["leakcheck", "--exclude=vendor,build", "."]).unwrap();
    assert_eq!(
        parse_excludes(cli.exclude.as_deref()),
        ["vendor", "build"]
    );
}

#[test]
fn test_exclude_space_syntax() {
    let cli = Cli::try_parse_from(["leakcheck", "--exclude", "vendor", "."]).unwrap();
    assert_eq!(cli.exclude.as_deref(), Some("vendor"));
}

#[test]
fn test_exclude_trims_whitespace() {
    assert_eq!(
        parse_excludes(Some("vendor , build , third_party")),
        ["vendor", "build", "third_party"]
    );
}

#[test]
fn test_json_flag() {
    let cli = Cli::try_parse_from(["leakcheck", "--json", "src"]).unwrap();
    assert!(cli.json);
}

#[test]
fn test_version_flag() {
    let cli = Cli::try_parse_from(["leakcheck", "--version"]).unwrap();
    assert!(cli.version);
    assert!(cli.paths.is_empty());
}

#[test]
fn test_help_is_generated() {
    let err = Cli::try_parse_from(["leakcheck", "--help"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    let rendered = err.to_string();
    assert!(rendered.contains("--exclude"));
    assert!(rendered.contains("--json"));
}

#[test]
fn test_unknown_flag_rejected() {
    let err = Cli::try_parse_from(["leakcheck", "--bogus"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownArgument);
}

#[test]
fn test_debug_and_quiet_flags() {
    let cli = Cli::try_parse_from(["leakcheck", "--debug", "-q", "src"]).unwrap();
    assert!(cli.debug);
    assert!(cli.quiet);
}
