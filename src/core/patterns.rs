// ─── Identifier Patterns ───
// Pure string extraction shared by the catalog, the inspector and the resolver.
// Extractors never fail: no match yields an empty string (or 0 for years).

use std::sync::OnceLock;

use regex::Regex;

use crate::core::error::{HostError, HostResult};

fn build_number_finder() -> &'static Regex {
    static FINDER: OnceLock<Regex> = OnceLock::new();
    FINDER.get_or_init(|| Regex::new(r".*(?P<build>\d{8}_\d{4}).*").expect("valid build pattern"))
}

fn build_target_finder() -> &'static Regex {
    static FINDER: OnceLock<Regex> = OnceLock::new();
    FINDER.get_or_init(|| {
        Regex::new(r".*\((?P<target>[xX]\d{2})\).*").expect("valid target pattern")
    })
}

fn product_year_finder() -> &'static Regex {
    static FINDER: OnceLock<Regex> = OnceLock::new();
    FINDER.get_or_init(|| {
        Regex::new(r".*\s+(?P<year>\d{4}).*").expect("valid product year pattern")
    })
}

/// Pull a vendor build number (`20180101_1515`) out of arbitrary text.
///
/// The leading `.*` is greedy, so with several candidates the last one wins.
pub fn extract_build_number(text: &str) -> String {
    build_number_finder()
        .captures(text)
        .and_then(|caps| caps.name("build"))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Pull an architecture tag such as `x64` out of a `(x64)` group.
pub fn extract_build_target(text: &str) -> String {
    build_target_finder()
        .captures(text)
        .and_then(|caps| caps.name("target"))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Year token of a product name (`"Revit 2019 - German"` → 2019), or 0.
pub fn product_year_from_name(name: &str) -> u32 {
    product_year_finder()
        .captures(name)
        .and_then(|caps| caps.name("year"))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Matches registry display names of the application itself.
///
/// Matching:
///     Revit 2019
///     Revit 2019 - German
///     Revit Architecture 2016 - Imperial
/// Not matching:
///     Revit Content Libraries 2016
#[derive(Debug, Clone)]
pub struct FamilyFilter {
    pattern: Regex,
}

impl FamilyFilter {
    pub fn new(family_name: &str) -> HostResult<Self> {
        let source = format!(r"^{}\s[A-Za-z]*\s*\d{{4}}\s?($|\s-)", regex::escape(family_name));
        let pattern = Regex::new(&source)
            .map_err(|e| HostError::Other(format!("invalid family pattern {source:?}: {e}")))?;
        Ok(Self { pattern })
    }

    pub fn is_match(&self, display_name: &str) -> bool {
        self.pattern.is_match(display_name)
    }
}
