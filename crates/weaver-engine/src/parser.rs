//! Delimiter-based response parser
//!
//! Extracts the HTML, CSS and JavaScript sections from a free-text model reply.
//! Each section is matched independently and non-greedily, so sections may
//! appear in any order. Missing sections come back as empty strings.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::bundle::MultiFileCode;
use crate::markers::{self, MarkerPair};

/// Error returned when a non-empty reply contains none of the delimiter pairs
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("response did not contain any delimited code sections")]
    FormatMismatch,
}

fn section_pattern(pair: MarkerPair) -> Regex {
    let pattern = format!(
        "(?s){}(.*?){}",
        regex::escape(pair.start),
        regex::escape(pair.end)
    );
    Regex::new(&pattern).expect("escaped marker literals form a valid pattern")
}

static HTML_RE: Lazy<Regex> = Lazy::new(|| section_pattern(markers::HTML));
static CSS_RE: Lazy<Regex> = Lazy::new(|| section_pattern(markers::CSS));
static JS_RE: Lazy<Regex> = Lazy::new(|| section_pattern(markers::JS));

fn capture(re: &Regex, raw: &str) -> String {
    re.captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Extract every section that has a complete delimiter pair.
///
/// Never fails; absent or unterminated sections are empty.
pub fn parse_sections(raw: &str) -> MultiFileCode {
    MultiFileCode {
        html: capture(&HTML_RE, raw),
        css: capture(&CSS_RE, raw),
        js: capture(&JS_RE, raw),
    }
}

/// Parse an edit reply, flagging a reply that has text but no sections.
///
/// An empty or whitespace-only reply yields empty sections rather than an
/// error. A reply where only some pairs are present is accepted with the
/// others empty.
pub fn parse_edit_response(raw: &str) -> Result<MultiFileCode, ParseError> {
    let code = parse_sections(raw);
    if code.is_empty() && !raw.trim().is_empty() {
        log::warn!(
            "Edit response of {} bytes contained no delimited sections",
            raw.len()
        );
        return Err(ParseError::FormatMismatch);
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::serialize_existing_code;

    #[test]
    fn test_extracts_sections_in_any_order() {
        let raw = "Here you go!\n\
            // JAVASCRIPT_CODE_START\n  document.title = 'x';\n// JAVASCRIPT_CODE_END\n\
            /* CSS_CODE_START */\nbody { margin: 0; }\n\n/* CSS_CODE_END */\n\
            <!-- HTML_CODE_START -->\n\n<h1>Title</h1>\n<!-- HTML_CODE_END -->\nDone.";

        let code = parse_edit_response(raw).unwrap();
        assert_eq!(code.html, "<h1>Title</h1>");
        assert_eq!(code.css, "body { margin: 0; }");
        assert_eq!(code.js, "document.title = 'x';");
    }

    #[test]
    fn test_multiline_sections_are_preserved() {
        let raw = "<!-- HTML_CODE_START -->\n<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>\n<!-- HTML_CODE_END -->";
        let code = parse_sections(raw);
        assert_eq!(code.html, "<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>");
        assert!(code.css.is_empty());
        assert!(code.js.is_empty());
    }

    #[test]
    fn test_first_pair_wins_non_greedy() {
        let raw = "/* CSS_CODE_START */a{}/* CSS_CODE_END */ junk /* CSS_CODE_START */b{}/* CSS_CODE_END */";
        assert_eq!(parse_sections(raw).css, "a{}");
    }

    #[test]
    fn test_empty_input_is_not_a_mismatch() {
        assert_eq!(parse_edit_response("").unwrap(), MultiFileCode::default());
        assert_eq!(parse_edit_response("  \n\t").unwrap(), MultiFileCode::default());
    }

    #[test]
    fn test_text_without_markers_is_a_mismatch() {
        let raw = "Sure! I changed the button color to blue.";
        assert_eq!(parse_edit_response(raw), Err(ParseError::FormatMismatch));
    }

    #[test]
    fn test_empty_pairs_in_text_is_a_mismatch() {
        let raw = "nothing changed\n<!-- HTML_CODE_START --><!-- HTML_CODE_END -->";
        assert_eq!(parse_edit_response(raw), Err(ParseError::FormatMismatch));
    }

    #[test]
    fn test_partial_pairs_degrade_to_empty() {
        let raw = "<!-- HTML_CODE_START -->\n<p>x</p>\n<!-- HTML_CODE_END -->\n/* CSS_CODE_START */ unterminated";
        let code = parse_edit_response(raw).unwrap();
        assert_eq!(code.html, "<p>x</p>");
        assert!(code.css.is_empty());
        assert!(code.js.is_empty());
    }

    #[test]
    fn test_markers_are_case_sensitive() {
        let raw = "<!-- html_code_start -->x<!-- html_code_end -->";
        assert_eq!(parse_edit_response(raw), Err(ParseError::FormatMismatch));
    }

    #[test]
    fn test_serialized_code_round_trips() {
        let code = MultiFileCode::new(
            "<main>\n  <button id=\"go\">Go</button>\n</main>",
            "button { color: rebeccapurple; }",
            "document.getElementById('go').onclick = () => alert('hi');",
        );
        let echoed = format!("Updated code below.\n{}", serialize_existing_code(&code));
        assert_eq!(parse_edit_response(&echoed).unwrap(), code);
    }
}
