//! Application-wide constants
//!
//! Single source of truth for storage keys, default names and file names.

/// Persistence keys and paths
pub mod storage {
    /// Key under which the project list is persisted
    pub const PROJECTS_KEY: &str = "webWeaverProjects_v1";
    /// Application directory name under the platform data directory
    pub const APP_DIR: &str = "web-weaver";
    /// Fallback data directory when the platform has none
    pub const FALLBACK_DIR: &str = ".web-weaver";
    /// Configuration file name inside the data directory
    pub const CONFIG_FILE: &str = "config.json";
}

/// Default snapshot names
pub mod names {
    /// Suggested name for a snapshot with no associated project
    pub const UNTITLED: &str = "Untitled Project";
    /// Prefix for save-as-copy suggestions
    pub const COPY_PREFIX: &str = "Copy of ";
    /// Archive name when a project name sanitizes to nothing
    pub const EXPORT_FALLBACK: &str = "web-weaver-export";
}

/// Exported file names
pub mod files {
    pub const HTML: &str = "index.html";
    pub const CSS: &str = "style.css";
    pub const JS: &str = "script.js";
    pub const COMPONENT: &str = "App.jsx";
    pub const PREVIEW: &str = "preview.html";
}

/// Script URLs for running a React component without a build step
pub mod cdn {
    pub const REACT: &str = "https://unpkg.com/react@18/umd/react.development.js";
    pub const REACT_DOM: &str = "https://unpkg.com/react-dom@18/umd/react-dom.development.js";
    pub const BABEL: &str = "https://unpkg.com/@babel/standalone/babel.min.js";
}
