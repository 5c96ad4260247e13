//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - The exhibit core stays UI-agnostic (no terminal crates)
//! - No sleep() calls in core production code
//! - No unwrap()/expect() in production code
//!
//! The helpers here find production source lines; the checks live under
//! `tests/`.

use std::fs;
use std::path::{Path, PathBuf};

/// Workspace root, resolved from this crate's manifest
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

/// All `.rs` files under `dir` (relative to the workspace root)
pub fn rust_files(dir: &str) -> Vec<PathBuf> {
    let root = workspace_root().join(dir);
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect()
}

/// A production source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based line number
    pub number: usize,
    /// Code with any `//` comment removed
    pub code: String,
}

/// Code lines of `content` up to its test module, comments stripped
pub fn production_lines(content: &str) -> Vec<SourceLine> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| !line.trim_start().starts_with("#[cfg(test)]"))
        .filter_map(|(idx, line)| {
            let code = line.split("//").next().unwrap_or(line);
            if code.trim().is_empty() {
                None
            } else {
                Some(SourceLine {
                    number: idx + 1,
                    code: code.to_string(),
                })
            }
        })
        .collect()
}

/// Production lines of every file under `dir` matching `predicate`,
/// formatted as `path:line - code`
pub fn find_violations(dir: &str, predicate: impl Fn(&Path, &str) -> bool) -> Vec<String> {
    let mut violations = Vec::new();
    for path in rust_files(dir) {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        for line in production_lines(&content) {
            if predicate(&path, &line.code) {
                violations.push(format!(
                    "{}:{} - {}",
                    path.display(),
                    line.number,
                    line.code.trim()
                ));
            }
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let src = "fn a() {}\n// note\nlet x = y.unwrap(); // ok\n#[cfg(test)]\nmod tests { fn b() { z.unwrap(); } }\n";
        let lines = production_lines(src);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].number, 1);
        assert_eq!(lines[1].number, 3);
        assert_eq!(lines[1].code.trim(), "let x = y.unwrap();");
    }

    #[test]
    fn test_workspace_root_has_members() {
        let root = workspace_root();
        assert!(root.join("exhibit").join("core").join("Cargo.toml").exists());
        assert!(root.join("tui").join("Cargo.toml").exists());
    }
}
