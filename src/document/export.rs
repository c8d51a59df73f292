use std::{fs, path::Path};

use crate::{
    document::{DocumentFormat, detect_format, escape_html, has_markup, model::Document, strip_markup},
    error::Result,
};

pub fn export_txt(path: &Path, doc: &Document) -> Result<()> {
    fs::write(path, to_plain_text(doc))?;
    Ok(())
}

pub fn export_html(path: &Path, doc: &Document) -> Result<()> {
    fs::write(path, to_html(doc))?;
    Ok(())
}

pub fn export_tab(path: &Path, doc: &Document) -> Result<()> {
    fs::write(path, doc.to_json()?)?;
    Ok(())
}

pub fn to_plain_text(doc: &Document) -> String {
    strip_markup(&doc.content)
}

/// Standalone HTML page. Review colour spans survive as-is; plain content
/// becomes one paragraph per line.
pub fn to_html(doc: &Document) -> String {
    let body = if has_markup(&doc.content) {
        doc.content.clone()
    } else {
        doc.content
            .lines()
            .map(|line| format!("<p>{}</p>", escape_html(line)))
            .collect::<String>()
    };

    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{}</title><style>body{{font-family:'Lucida Fulfulde','Segoe UI',sans-serif;max-width:840px;margin:24px auto;line-height:1.6}}</style></head><body>{}</body></html>",
        escape_html(&doc.title),
        body
    )
}

pub fn save_with_format(path: &Path, doc: &Document) -> Result<DocumentFormat> {
    let format = detect_format(path);
    match format {
        DocumentFormat::Tabital => export_tab(path, doc)?,
        DocumentFormat::Html => export_html(path, doc)?,
        DocumentFormat::Text | DocumentFormat::Unknown => export_txt(path, doc)?,
    }
    Ok(format)
}
