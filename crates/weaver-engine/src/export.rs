//! Archive and single-file export
//!
//! A bundle exports as a ZIP of runnable files, or one section at a time as
//! a plain text file with its MIME type.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::bundle::{CodeBundle, Section};
use crate::constants::{files, names};
use crate::error::{Result, WeaverError};
use crate::preview::{react_runtime_scripts, REACT_BOOTSTRAP};

/// One exported file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub contents: String,
}

fn multi_file_index(html: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
<link rel=\"stylesheet\" href=\"{}\">\n</head>\n<body>\n{}\n\
<script type=\"module\" src=\"{}\"></script>\n</body>\n</html>\n",
        files::CSS,
        html,
        files::JS
    )
}

fn component_index() -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
<link rel=\"stylesheet\" href=\"{}\">\n{}\n</head>\n<body>\n<div id=\"root\"></div>\n\
<script type=\"text/babel\" data-presets=\"react\" src=\"{}\"></script>\n\
<script type=\"text/babel\" data-presets=\"react\">{}</script>\n</body>\n</html>\n",
        files::CSS,
        react_runtime_scripts(),
        files::COMPONENT,
        REACT_BOOTSTRAP
    )
}

/// The file exported for one section, `None` if the section isn't part of
/// the bundle's variant
pub fn section_file(code: &CodeBundle, section: Section) -> Option<ExportFile> {
    let contents = code.section(section)?.to_string();
    let (file_name, mime_type) = match section {
        Section::Html => (files::HTML, "text/html"),
        Section::Css => (files::CSS, "text/css"),
        Section::Js => (files::JS, "text/javascript"),
        Section::Component => (files::COMPONENT, "text/javascript"),
    };
    Some(ExportFile {
        file_name,
        mime_type,
        contents,
    })
}

/// Every file that goes into the archive
pub fn archive_files(code: &CodeBundle) -> Vec<ExportFile> {
    match code {
        CodeBundle::MultiFile(code) => vec![
            ExportFile {
                file_name: files::HTML,
                mime_type: "text/html",
                contents: multi_file_index(&code.html),
            },
            ExportFile {
                file_name: files::CSS,
                mime_type: "text/css",
                contents: code.css.clone(),
            },
            ExportFile {
                file_name: files::JS,
                mime_type: "text/javascript",
                contents: code.js.clone(),
            },
        ],
        CodeBundle::Component(code) => vec![
            ExportFile {
                file_name: files::HTML,
                mime_type: "text/html",
                contents: component_index(),
            },
            ExportFile {
                file_name: files::CSS,
                mime_type: "text/css",
                contents: code.css.clone(),
            },
            ExportFile {
                file_name: files::COMPONENT,
                mime_type: "text/javascript",
                contents: code.component.clone(),
            },
        ],
    }
}

/// Build the ZIP archive in memory
pub fn archive_bytes(code: &CodeBundle) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for file in archive_files(code) {
        zip.start_file(file.file_name, options)?;
        zip.write_all(file.contents.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

/// Archive file name for a project name.
///
/// Characters other than ASCII letters, digits, `_`, `.`, `-` and whitespace
/// are dropped and whitespace runs become `_`.
pub fn archive_file_name(project_name: &str) -> String {
    let kept: String = project_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') || c.is_whitespace())
        .collect();

    let mut safe = String::with_capacity(kept.len());
    let mut in_space = false;
    for c in kept.chars() {
        if c.is_whitespace() {
            if !in_space {
                safe.push('_');
            }
            in_space = true;
        } else {
            safe.push(c);
            in_space = false;
        }
    }

    if safe.is_empty() {
        safe = names::EXPORT_FALLBACK.to_string();
    }
    format!("{safe}.zip")
}

/// Write the archive into `dir`, returning its path
pub fn write_archive(dir: &Path, project_name: &str, code: &CodeBundle) -> Result<PathBuf> {
    if !code.has_code() {
        return Err(WeaverError::invalid("There is no code to export"));
    }
    let bytes = archive_bytes(code)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(archive_file_name(project_name));
    std::fs::write(&path, &bytes)?;
    log::info!("Exported {} bytes to {:?}", bytes.len(), path);
    Ok(path)
}

/// Write one section into `dir`, returning its path
pub fn write_section(dir: &Path, code: &CodeBundle, section: Section) -> Result<PathBuf> {
    let file = section_file(code, section).ok_or_else(|| {
        WeaverError::invalid(format!(
            "{} is not part of {} code",
            section.label(),
            code.variant()
        ))
    })?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file.file_name);
    std::fs::write(&path, &file.contents)?;
    log::debug!("Wrote {} ({}) to {:?}", file.file_name, file.mime_type, path);
    Ok(path)
}
