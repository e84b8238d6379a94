//! Code bundle value types
//!
//! A bundle is the set of source artifacts being edited. Its shape depends on
//! the product variant and never mixes the two.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Product variant: which shape of code the session works with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Separate HTML, CSS and JavaScript
    #[default]
    MultiFile,
    /// A React functional component named `App` plus CSS
    Component,
}

impl Variant {
    /// Sections a bundle of this variant consists of, in display order
    pub fn sections(self) -> &'static [Section] {
        match self {
            Variant::MultiFile => &[Section::Html, Section::Css, Section::Js],
            Variant::Component => &[Section::Component, Section::Css],
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::MultiFile => write!(f, "multi_file"),
            Variant::Component => write!(f, "component"),
        }
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multi_file" | "multi-file" | "html" => Ok(Variant::MultiFile),
            "component" | "react" => Ok(Variant::Component),
            other => Err(format!("unknown variant '{}'", other)),
        }
    }
}

/// One editable section of a bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Html,
    Css,
    Js,
    Component,
}

impl Section {
    /// Label used in notifications
    pub fn label(self) -> &'static str {
        match self {
            Section::Html => "HTML",
            Section::Css => "CSS",
            Section::Js => "JavaScript",
            Section::Component => "Component",
        }
    }

    /// File extensions accepted when uploading into this section
    pub fn accepted_extensions(self) -> &'static [&'static str] {
        match self {
            Section::Html => &["html", "htm"],
            Section::Css => &["css"],
            Section::Js => &["js", "mjs"],
            Section::Component => &["jsx", "tsx", "js"],
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(Section::Html),
            "css" => Ok(Section::Css),
            "js" | "javascript" => Ok(Section::Js),
            "component" | "jsx" => Ok(Section::Component),
            other => Err(format!("unknown section '{}'", other)),
        }
    }
}

/// HTML + CSS + JavaScript
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MultiFileCode {
    pub html: String,
    pub css: String,
    pub js: String,
}

impl MultiFileCode {
    pub fn new(html: impl Into<String>, css: impl Into<String>, js: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            css: css.into(),
            js: js.into(),
        }
    }

    /// True when every section is empty
    pub fn is_empty(&self) -> bool {
        self.html.is_empty() && self.css.is_empty() && self.js.is_empty()
    }
}

/// React component + CSS
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComponentCode {
    pub component: String,
    pub css: String,
}

impl ComponentCode {
    pub fn new(component: impl Into<String>, css: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            css: css.into(),
        }
    }
}

/// The working set of generated/edited source artifacts.
///
/// Serialized untagged so a project record carries the section fields at its
/// top level (`html`/`css`/`js` or `component`/`css`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CodeBundle {
    MultiFile(MultiFileCode),
    Component(ComponentCode),
}

impl CodeBundle {
    /// An empty bundle of the given variant
    pub fn empty(variant: Variant) -> Self {
        match variant {
            Variant::MultiFile => CodeBundle::MultiFile(MultiFileCode::default()),
            Variant::Component => CodeBundle::Component(ComponentCode::default()),
        }
    }

    pub fn variant(&self) -> Variant {
        match self {
            CodeBundle::MultiFile(_) => Variant::MultiFile,
            CodeBundle::Component(_) => Variant::Component,
        }
    }

    /// True when any section has non-whitespace content
    pub fn has_code(&self) -> bool {
        self.variant()
            .sections()
            .iter()
            .any(|s| self.section(*s).is_some_and(|c| !c.trim().is_empty()))
    }

    pub fn css(&self) -> &str {
        match self {
            CodeBundle::MultiFile(code) => &code.css,
            CodeBundle::Component(code) => &code.css,
        }
    }

    /// Contents of a section, or `None` if the section isn't part of this variant
    pub fn section(&self, section: Section) -> Option<&str> {
        match (self, section) {
            (CodeBundle::MultiFile(code), Section::Html) => Some(&code.html),
            (CodeBundle::MultiFile(code), Section::Js) => Some(&code.js),
            (CodeBundle::Component(code), Section::Component) => Some(&code.component),
            (_, Section::Css) => Some(self.css()),
            _ => None,
        }
    }

    /// Mutable access to a section, or `None` if the section isn't part of this variant
    pub fn section_mut(&mut self, section: Section) -> Option<&mut String> {
        match (self, section) {
            (CodeBundle::MultiFile(code), Section::Html) => Some(&mut code.html),
            (CodeBundle::MultiFile(code), Section::Css) => Some(&mut code.css),
            (CodeBundle::MultiFile(code), Section::Js) => Some(&mut code.js),
            (CodeBundle::Component(code), Section::Component) => Some(&mut code.component),
            (CodeBundle::Component(code), Section::Css) => Some(&mut code.css),
            _ => None,
        }
    }
}

impl From<MultiFileCode> for CodeBundle {
    fn from(code: MultiFileCode) -> Self {
        CodeBundle::MultiFile(code)
    }
}

impl From<ComponentCode> for CodeBundle {
    fn from(code: ComponentCode) -> Self {
        CodeBundle::Component(code)
    }
}
