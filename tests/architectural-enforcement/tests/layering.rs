//! Integration Test: Layering and Panic-Free Production Code
//!
//! **Policy**:
//! - `exhibit-core` is UI-agnostic: it never depends on or imports a
//!   terminal crate. Surfaces depend on the core, not the other way round.
//! - Production code propagates errors; `unwrap()` and `expect()` are for
//!   tests only.

use std::fs;
use std::path::Path;

use architectural_enforcement::{find_violations, workspace_root};

const TERMINAL_CRATES: &[&str] = &["ratatui", "crossterm"];

#[test]
fn test_core_manifest_has_no_terminal_crates() {
    let manifest = fs::read_to_string(workspace_root().join("exhibit/core/Cargo.toml"))
        .expect("exhibit/core/Cargo.toml is readable");

    for name in TERMINAL_CRATES {
        assert!(
            !manifest.lines().any(|l| l.trim_start().starts_with(name)),
            "exhibit-core must not depend on {name}"
        );
    }
}

#[test]
fn test_core_sources_do_not_import_terminal_crates() {
    let violations = find_violations("exhibit/core/src", |_: &Path, code| {
        TERMINAL_CRATES
            .iter()
            .any(|name| code.contains(&format!("{name}::")))
    });

    assert!(
        violations.is_empty(),
        "exhibit-core imports terminal crates:\n{}",
        violations.join("\n")
    );
}

#[test]
fn test_no_unwrap_or_expect_in_production_code() {
    let mut violations = Vec::new();
    for dir in ["exhibit/core/src", "tui/src"] {
        violations.extend(find_violations(dir, |_: &Path, code| {
            code.contains(".unwrap()") || code.contains(".expect(")
        }));
    }

    if !violations.is_empty() {
        eprintln!("\n❌ unwrap()/expect() found in production code!\n");
        for violation in &violations {
            eprintln!("  ❌ {}", violation);
        }
        panic!(
            "\nFound {} panicking call(s) in production code.\nPropagate the error instead.",
            violations.len()
        );
    }
}
