//! Deterministic text understanding: order-reference extraction,
//! product-keyword matching, and intent classification.
//!
//! All three components are driven by declared tables rather than ad-hoc
//! control flow, so the recognized patterns can be enumerated and
//! extended without touching the scanners.

use orderly_core::domain::order::OrderId;

/// Whitespace allowance between a pattern's anchor and its digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gap {
    None,
    Optional,
    Required,
}

/// One order-reference form: a literal anchor, a whitespace rule, and
/// whether a `#` may sit immediately before the digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReferencePattern {
    pub anchor: &'static str,
    pub gap: Gap,
    pub allow_hash: bool,
}

/// Ordered reference forms, most specific first: contextual anchors
/// ("order", "id") are tried before the permissive bare `#` so an
/// incidental digit elsewhere in the sentence is not misattributed.
/// The first numeric capture wins.
pub const REFERENCE_PATTERNS: &[ReferencePattern] = &[
    ReferencePattern { anchor: "order", gap: Gap::Optional, allow_hash: true },
    ReferencePattern { anchor: "#", gap: Gap::None, allow_hash: false },
    ReferencePattern { anchor: "order", gap: Gap::Required, allow_hash: false },
    ReferencePattern { anchor: "id", gap: Gap::Optional, allow_hash: true },
];

/// Product vocabulary: lowercase keyword paired with the canonical
/// product label used for store lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProductKeyword {
    pub keyword: &'static str,
    pub label: &'static str,
}

pub const PRODUCT_VOCABULARY: &[ProductKeyword] = &[
    ProductKeyword { keyword: "earbuds", label: "Earbuds" },
    ProductKeyword { keyword: "headphones", label: "Headphones" },
    ProductKeyword { keyword: "case", label: "Case" },
    ProductKeyword { keyword: "cable", label: "Cable" },
    ProductKeyword { keyword: "speaker", label: "Speaker" },
];

/// Keywords that mark a query as order-related, on top of the product
/// vocabulary and any digit sequence.
pub const INTENT_KEYWORDS: &[&str] = &[
    "order",
    "delivery",
    "shipping",
    "track",
    "status",
    "where",
    "when",
    "delivered",
    "shipped",
    "transit",
    "package",
    "parcel",
    "tracking",
];

fn normalize_text(text: &str) -> String {
    text.to_ascii_lowercase()
}

/// Pulls a numeric order reference out of free text by applying
/// [`REFERENCE_PATTERNS`] in order, case-insensitively.
#[derive(Clone, Debug, Default)]
pub struct ReferenceExtractor;

impl ReferenceExtractor {
    pub fn new() -> Self {
        Self
    }

    /// First capture wins across the ordered pattern table. Captures of
    /// zero and digit runs that overflow `i64` are not valid order
    /// references; the scan steps past them.
    pub fn extract(&self, text: &str) -> Option<OrderId> {
        let normalized = normalize_text(text);
        REFERENCE_PATTERNS.iter().find_map(|pattern| scan_pattern(&normalized, pattern))
    }
}

fn scan_pattern(normalized: &str, pattern: &ReferencePattern) -> Option<OrderId> {
    let mut search_from = 0;
    while let Some(offset) = normalized[search_from..].find(pattern.anchor) {
        let anchor_start = search_from + offset;
        let after_anchor = anchor_start + pattern.anchor.len();
        if let Some(order_id) = capture_digits(&normalized[after_anchor..], pattern) {
            return Some(order_id);
        }
        search_from = anchor_start + 1;
    }
    None
}

fn capture_digits(rest: &str, pattern: &ReferencePattern) -> Option<OrderId> {
    let bytes = rest.as_bytes();
    let mut index = 0;

    match pattern.gap {
        Gap::None => {}
        Gap::Optional => {
            while index < bytes.len() && bytes[index].is_ascii_whitespace() {
                index += 1;
            }
        }
        Gap::Required => {
            let start = index;
            while index < bytes.len() && bytes[index].is_ascii_whitespace() {
                index += 1;
            }
            if index == start {
                return None;
            }
        }
    }

    if pattern.allow_hash && index < bytes.len() && bytes[index] == b'#' {
        index += 1;
    }

    let digits_start = index;
    while index < bytes.len() && bytes[index].is_ascii_digit() {
        index += 1;
    }
    if index == digits_start {
        return None;
    }

    let value = rest[digits_start..index].parse::<i64>().ok()?;
    (value > 0).then_some(OrderId(value))
}

/// Detects product-category keywords via case-insensitive containment.
#[derive(Clone, Debug, Default)]
pub struct ProductMatcher;

impl ProductMatcher {
    pub fn new() -> Self {
        Self
    }

    /// All vocabulary hits, in declaration order. Callers wanting a
    /// single category take the first.
    pub fn matches(&self, text: &str) -> Vec<&'static ProductKeyword> {
        let normalized = normalize_text(text);
        PRODUCT_VOCABULARY
            .iter()
            .filter(|entry| normalized.contains(entry.keyword))
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    OrderRelated,
    General,
}

/// Total, stateless classifier: order-related when any intent or
/// product keyword appears, or when the text carries a digit sequence.
#[derive(Clone, Debug, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, text: &str) -> Intent {
        let normalized = normalize_text(text);

        let keyword_hit = INTENT_KEYWORDS.iter().any(|keyword| normalized.contains(keyword))
            || PRODUCT_VOCABULARY.iter().any(|entry| normalized.contains(entry.keyword));
        let digit_hit = normalized.bytes().any(|byte| byte.is_ascii_digit());

        if keyword_hit || digit_hit {
            Intent::OrderRelated
        } else {
            Intent::General
        }
    }
}
