//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code in the exhibit core MUST NOT call sleep
//! methods. Waiting is done on channels, spawned tasks and
//! `tokio::time::timeout`; status rotation is driven by the surface's frame
//! loop calling `poll`.
//! **Exceptions**: Frame pacing in the TUI (it uses `tokio::time::interval`),
//! test code.

use std::path::Path;

use architectural_enforcement::{find_violations, production_lines};

fn is_sleep_call(code: &str) -> bool {
    code.contains("::sleep(") || code.contains(".sleep(")
}

/// Test that core production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_core_production_code() {
    let violations = find_violations("exhibit/core/src", |_: &Path, code| is_sleep_call(code));

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Sleep calls found in core production code!\n");
        for violation in &violations {
            eprintln!("  ❌ {}", violation);
        }
        eprintln!("\n✅ Use instead:");
        eprintln!("  - tokio::time::timeout around the awaited work");
        eprintln!("  - deadlines checked from Orchestrator::poll");

        panic!(
            "\nFound {} sleep violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

/// The TUI paces frames with an interval, never a sleep
#[test]
fn test_tui_frame_loop_uses_interval() {
    let violations = find_violations("tui/src", |_: &Path, code| is_sleep_call(code));
    assert!(
        violations.is_empty(),
        "TUI production code sleeps:\n{}",
        violations.join("\n")
    );
}

#[test]
fn test_sleep_violation_detection() {
    let src = "fn bad() {\n    tokio::time::sleep(d).await;\n}\n#[cfg(test)]\nmod tests {\n    fn ok() { std::thread::sleep(d); }\n}\n";
    let hits: Vec<_> = production_lines(src)
        .into_iter()
        .filter(|l| is_sleep_call(&l.code))
        .collect();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].number, 2);
}
