//! Report artifact: the post record as pretty JSON inside an editable HTML page.

use crate::types::{PostReport, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::info;

const TEXTAREA_OPEN: &str = "<textarea style=\"width:100%; height:500px;\">";
const TEXTAREA_CLOSE: &str = "</textarea>";

/// Pretty JSON with a four space indent.
pub fn to_pretty_json(report: &PostReport) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    report.serialize(&mut serializer)?;
    // serde_json only ever emits UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn render_report(report: &PostReport) -> Result<String> {
    let json = to_pretty_json(report)?;

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
</head>
<body>
    <h2>New Post Data for Editing</h2>
    <p>Copy the code below for Cloudflare KV:</p>
    {open}{json}{close}
</body>
</html>
"#,
        title = escape_html(&report.title),
        open = TEXTAREA_OPEN,
        json = escape_html(&json),
        close = TEXTAREA_CLOSE,
    ))
}

/// Recover the JSON text from a rendered report, as a browser would show it
/// inside the text area.
pub fn extract_embedded_json(html: &str) -> Option<String> {
    let start = html.find(TEXTAREA_OPEN)? + TEXTAREA_OPEN.len();
    let len = html[start..].find(TEXTAREA_CLOSE)?;
    Some(unescape_html(&html[start..start + len]))
}

pub fn report_file_name(unix_seconds: i64) -> String {
    format!("post_update_{}.html", unix_seconds)
}

/// Write the rendered report into `output_dir`, named after `unix_seconds`.
/// Refuses to overwrite an existing report.
pub async fn write_report(output_dir: &Path, report: &PostReport, unix_seconds: i64) -> Result<PathBuf> {
    let html = render_report(report)?;

    tokio::fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(report_file_name(unix_seconds));

    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await?;
    file.write_all(html.as_bytes()).await?;
    file.flush().await?;

    info!("Wrote report {} ({} bytes)", path.display(), html.len());
    Ok(path)
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
