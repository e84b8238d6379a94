//! Live-preview documents
//!
//! The preview is a single HTML document composed from the bundle. It is
//! meant to run inside a sandboxed frame; [`host_page`] wraps it in such a
//! frame sized to a viewport preset so it can be opened directly in a browser.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::bundle::{CodeBundle, ComponentCode, MultiFileCode};
use crate::constants::cdn;

/// Permissions granted to the preview frame
pub const SANDBOX_PERMISSIONS: &str =
    "allow-scripts allow-same-origin allow-forms allow-modals allow-popups";

/// Responsive frame size presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewport {
    Mobile,
    Tablet,
    Desktop,
    #[default]
    Fill,
}

impl Viewport {
    pub const ALL: [Viewport; 4] = [
        Viewport::Mobile,
        Viewport::Tablet,
        Viewport::Desktop,
        Viewport::Fill,
    ];

    /// CSS width of the frame
    pub fn width(self) -> &'static str {
        match self {
            Viewport::Mobile => "375px",
            Viewport::Tablet => "768px",
            Viewport::Desktop => "1280px",
            Viewport::Fill => "100%",
        }
    }

    /// CSS height of the frame
    pub fn height(self) -> &'static str {
        "100%"
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Viewport::Mobile => "mobile",
            Viewport::Tablet => "tablet",
            Viewport::Desktop => "desktop",
            Viewport::Fill => "fill",
        };
        write!(f, "{} ({})", name, self.width())
    }
}

impl FromStr for Viewport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mobile" | "375" => Ok(Viewport::Mobile),
            "tablet" | "768" => Ok(Viewport::Tablet),
            "desktop" | "1280" => Ok(Viewport::Desktop),
            "fill" | "full" => Ok(Viewport::Fill),
            other => Err(format!("unknown viewport '{}'", other)),
        }
    }
}

/// Globals that let a component use hooks without importing React
const HOOK_GLOBALS: &str = "Object.assign(window, { useState: React.useState, \
useEffect: React.useEffect, useRef: React.useRef, useMemo: React.useMemo, \
useCallback: React.useCallback, useReducer: React.useReducer, useContext: React.useContext });";

/// Renders `App` into the root element
pub(crate) const REACT_BOOTSTRAP: &str =
    "ReactDOM.createRoot(document.getElementById('root')).render(<App />);";

/// Script tags that load React, ReactDOM and Babel and expose the hooks
pub(crate) fn react_runtime_scripts() -> String {
    format!(
        "<script crossorigin src=\"{}\"></script>\
<script crossorigin src=\"{}\"></script>\
<script src=\"{}\"></script>\
<script>{}</script>",
        cdn::REACT,
        cdn::REACT_DOM,
        cdn::BABEL,
        HOOK_GLOBALS
    )
}

fn multi_file_document(code: &MultiFileCode) -> String {
    format!(
        "<html><head><style>{}</style></head><body>{}<script type=\"module\">{}</script></body></html>",
        code.css, code.html, code.js
    )
}

fn component_document(code: &ComponentCode) -> String {
    format!(
        "<html><head><style>{}</style>{}</head><body><div id=\"root\"></div>\
<script type=\"text/babel\" data-presets=\"react\">\n{}\n{}\n</script></body></html>",
        code.css,
        react_runtime_scripts(),
        code.component,
        REACT_BOOTSTRAP
    )
}

/// Compose the preview document for a bundle
pub fn compose_document(code: &CodeBundle) -> String {
    match code {
        CodeBundle::MultiFile(code) => multi_file_document(code),
        CodeBundle::Component(code) => component_document(code),
    }
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// A standalone page hosting the preview in a sandboxed frame
pub fn host_page(code: &CodeBundle, viewport: Viewport) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Live Preview</title>\
<style>html,body{{margin:0;height:100%;background:#f4f4f5}}\
iframe{{display:block;margin:0 auto;border:0;background:#fff}}</style></head>\
<body><iframe title=\"Live Preview\" sandbox=\"{}\" style=\"width:{};height:{}\" srcdoc=\"{}\"></iframe>\
</body></html>\n",
        SANDBOX_PERMISSIONS,
        viewport.width(),
        viewport.height(),
        escape_attribute(&compose_document(code))
    )
}

/// Write the hosted preview to `path`
pub fn write_preview(path: &Path, code: &CodeBundle, viewport: Viewport) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, host_page(code, viewport))?;
    log::debug!("Wrote {} preview to {:?}", viewport, path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_multi_file_document() {
        let code = CodeBundle::from(MultiFileCode::new("<p>hi</p>", "p{color:red}", "console.log(1)"));
        assert_eq!(
            compose_document(&code),
            "<html><head><style>p{color:red}</style></head><body><p>hi</p>\
<script type=\"module\">console.log(1)</script></body></html>"
        );
    }

    #[test]
    fn test_component_document_mounts_app() {
        let code = CodeBundle::from(ComponentCode::new(
            "function App() { return <h1>Hi</h1>; }",
            "h1{}",
        ));
        let doc = compose_document(&code);
        assert!(doc.contains("<style>h1{}</style>"));
        assert!(doc.contains(cdn::REACT));
        assert!(doc.contains(cdn::BABEL));
        assert!(doc.contains("<div id=\"root\"></div>"));
        assert!(doc.contains("function App()"));
        assert!(doc.contains(REACT_BOOTSTRAP));
    }

    #[test]
    fn test_host_page_sandboxes_and_escapes() {
        let code = CodeBundle::from(MultiFileCode::new("<a href=\"x\">&</a>", "", ""));
        let page = host_page(&code, Viewport::Mobile);
        assert!(page.contains(&format!("sandbox=\"{}\"", SANDBOX_PERMISSIONS)));
        assert!(page.contains("width:375px;height:100%"));
        assert!(page.contains("&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;"));
        assert!(!page.contains("<a href"));
    }

    #[test]
    fn test_viewport_presets() {
        assert_eq!(Viewport::Tablet.width(), "768px");
        assert_eq!(Viewport::Desktop.width(), "1280px");
        assert_eq!(Viewport::default().width(), "100%");
        assert_eq!("Mobile".parse::<Viewport>().unwrap(), Viewport::Mobile);
        assert!("watch".parse::<Viewport>().is_err());
    }

    #[test]
    fn test_write_preview_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out").join("preview.html");
        let code = CodeBundle::from(MultiFileCode::new("<p/>", "", ""));

        write_preview(&path, &code, Viewport::Fill).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<!DOCTYPE html>"));
    }
}
