//! Section delimiter markers
//!
//! Literal sentinels framing each language block inside a single free-text
//! model response. Shared by the prompt builder and the response parser;
//! matching is case-sensitive and exact.

/// Opening marker of the HTML block
pub const HTML_START: &str = "<!-- HTML_CODE_START -->";
/// Closing marker of the HTML block
pub const HTML_END: &str = "<!-- HTML_CODE_END -->";

/// Opening marker of the CSS block
pub const CSS_START: &str = "/* CSS_CODE_START */";
/// Closing marker of the CSS block
pub const CSS_END: &str = "/* CSS_CODE_END */";

/// Opening marker of the JavaScript block
pub const JS_START: &str = "// JAVASCRIPT_CODE_START";
/// Closing marker of the JavaScript block
pub const JS_END: &str = "// JAVASCRIPT_CODE_END";

/// A start/end marker pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerPair {
    pub start: &'static str,
    pub end: &'static str,
}

pub const HTML: MarkerPair = MarkerPair {
    start: HTML_START,
    end: HTML_END,
};

pub const CSS: MarkerPair = MarkerPair {
    start: CSS_START,
    end: CSS_END,
};

pub const JS: MarkerPair = MarkerPair {
    start: JS_START,
    end: JS_END,
};

impl MarkerPair {
    /// Frame `body` between the markers, one marker per line
    pub fn wrap(&self, body: &str) -> String {
        format!("{}\n{}\n{}", self.start, body, self.end)
    }
}
