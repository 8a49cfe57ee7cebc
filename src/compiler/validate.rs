//! Shallow structural checks over component source.
//!
//! Character counts and marker searches only. Braces inside strings and
//! comments are counted too, so valid input can be rejected and invalid input
//! accepted.

use regex::Regex;
use std::sync::LazyLock;

static EXPORT_CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bexport\s+class\s+[A-Za-z_$][\w$]*").expect("valid regex"));

/// Outcome of the sanity checks
#[derive(Debug, Clone, Default)]
pub struct SanityReport {
    pub checks: Vec<(String, bool)>,
    pub errors: Vec<String>,
}

impl SanityReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_check(&mut self, description: &str, passed: bool) {
        self.checks.push((description.to_string(), passed));
    }

    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn passed_checks(&self) -> usize {
        self.checks.iter().filter(|(_, passed)| *passed).count()
    }
}

fn check_pair(report: &mut SanityReport, source: &str, open: char, close: char, label: &str) {
    let opens = source.matches(open).count();
    let closes = source.matches(close).count();
    if opens == closes {
        report.add_check(&format!("Balanced {}", label), true);
    } else {
        report.add_check(&format!("Balanced {}", label), false);
        report.add_error(format!(
            "Mismatched {}: {} '{}' vs {} '{}'",
            label, opens, open, closes, close
        ));
    }
}

/// Run every check over `source`. `component_marker` is the decorator text
/// that must appear, e.g. `@Component`.
pub fn check_source(source: &str, component_marker: &str) -> SanityReport {
    let mut report = SanityReport::new();

    check_pair(&mut report, source, '{', '}', "braces");
    check_pair(&mut report, source, '(', ')', "parentheses");

    if source.contains(component_marker) {
        report.add_check("Component marker present", true);
    } else {
        report.add_check("Component marker present", false);
        report.add_error(format!("Missing {} decorator", component_marker));
    }

    if EXPORT_CLASS_RE.is_match(source) {
        report.add_check("Exported class present", true);
    } else {
        report.add_check("Exported class present", false);
        report.add_error("No exported class found".to_string());
    }

    report
}
