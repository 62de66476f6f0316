//! Codepage detection for parser input
//!
//! CAD files written by legacy tooling carry a `$DWGCODEPAGE` header naming
//! the character set of the rest of the file. Detection is a thin
//! preprocessing step: probe the bytes as UTF-8, scan the header for the
//! tag, map known aliases to a charset, and re-decode. Any failure falls
//! back to UTF-8 — decoding never aborts the pipeline.

use encoding_rs::{Encoding, GB18030, UTF_8};
use std::borrow::Cow;
use tracing::debug;

/// Scans decoded header text for a `$DWGCODEPAGE` variable and returns its
/// value. The variable name line is followed by a group-code line (`3` or
/// `2`) and then the value line.
pub fn detect_codepage(header: &str) -> Option<String> {
    let lines: Vec<&str> = header.lines().collect();
    for (i, line) in lines.iter().enumerate() {
        if line.trim() == "$DWGCODEPAGE" {
            let group_code = lines.get(i + 1).map(|l| l.trim())?;
            let value = lines.get(i + 2).map(|l| l.trim())?;
            if group_code == "3" || group_code == "2" {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Maps a codepage tag to a charset.
///
/// The alias table matches the files seen in the wild: pattern CAD tools
/// label GBK content as `ANSI_1252`/`ISO8859-1`, `ANSI_936` is GBK proper,
/// and other `ANSI_*` tags are Windows codepages. Unknown tags fall back
/// to UTF-8.
pub fn charset_for(codepage: &str) -> &'static Encoding {
    let cp = codepage.to_ascii_lowercase();
    match cp.as_str() {
        "ansi_1252" | "iso8859-1" | "ansi_936" | "gbk" => GB18030,
        _ => {
            if let Some(page) = cp.strip_prefix("ansi_") {
                let label = format!("windows-{page}");
                if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
                    return encoding;
                }
            }
            Encoding::for_label(cp.as_bytes()).unwrap_or(UTF_8)
        }
    }
}

/// Decodes raw parser input, honoring a declared codepage.
pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
    let probe = String::from_utf8_lossy(bytes);
    let encoding = match detect_codepage(&probe) {
        Some(tag) => {
            let charset = charset_for(&tag);
            debug!("Detected codepage {} -> {}", tag, charset.name());
            charset
        }
        None => UTF_8,
    };
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!(
            "Decoding with {} produced replacement characters",
            encoding.name()
        );
    }
    text
}
