//! Per-dependency search patterns for lexical usage matching.
//!
//! This is an explicit, documented heuristic: "does the codebase reference
//! this dependency" is approximated by substring search, not import-graph
//! analysis. False positives (a stray mention of the vendor name) and false
//! negatives (aliased imports) are accepted limitations. The
//! [`UsageMatcher`] trait keeps the heuristic pluggable so a stricter
//! analyzer can replace it.

/// The derived match patterns for one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsagePatterns {
    /// Studly-cased namespace form, e.g. `Acme\WidgetKit` for `acme/widget-kit`.
    pub namespace: String,
    /// Bare vendor segment as written in the package name, e.g. `acme`.
    pub vendor: String,
    /// Lowercase vendor+name with `/-_.` separators stripped, e.g. `acmewidgetkit`.
    pub literal: String,
}

impl UsagePatterns {
    /// Derive the patterns for a `vendor/package`-shaped name.
    ///
    /// Names without a vendor segment get the whole name as both vendor and
    /// package part.
    pub fn for_package(name: &str) -> Self {
        let (vendor, package) = match name.split_once('/') {
            Some((v, p)) => (v, p),
            None => (name, name),
        };

        let namespace = format!("{}\\{}", studly(vendor), studly(package));
        let literal: String = name
            .chars()
            .filter(|c| !matches!(c, '/' | '-' | '_' | '.'))
            .collect::<String>()
            .to_lowercase();

        Self {
            namespace,
            vendor: vendor.to_string(),
            literal,
        }
    }
}

/// Convert a separator-delimited segment to StudlyCase.
fn studly(segment: &str) -> String {
    segment
        .split(['-', '_', '.'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Decides whether a file's content references a package.
///
/// Implementations must be pure with respect to their inputs so that
/// re-running analysis on unchanged inputs reproduces identical results.
pub trait UsageMatcher: Send + Sync {
    /// True when `content` references the package described by `patterns`.
    fn matches(&self, content: &str, patterns: &UsagePatterns) -> bool;
}

/// The default best-effort lexical matcher.
///
/// A file is attributed to a dependency when its text contains the namespace
/// form, the bare vendor segment, or the literal token (the latter matched
/// case-insensitively).
pub struct SubstringMatcher;

impl UsageMatcher for SubstringMatcher {
    fn matches(&self, content: &str, patterns: &UsagePatterns) -> bool {
        if content.contains(&patterns.namespace) || content.contains(&patterns.vendor) {
            return true;
        }
        content.to_lowercase().contains(&patterns.literal)
    }
}
