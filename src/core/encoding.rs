//! Encoding detection for the validator's encoding pass
//!
//! Detects a leading byte order mark and extracts the encoding declared in
//! the XML declaration. The core never transcodes; unsupported encodings
//! are surfaced as warnings only.

/// Byte order mark kinds recognized at the start of input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bom {
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl Bom {
    /// Detect a BOM from the initial bytes
    pub fn detect(input: &[u8]) -> Option<Self> {
        if input.starts_with(&[0xEF, 0xBB, 0xBF]) {
            Some(Bom::Utf8)
        } else if input.starts_with(&[0xFF, 0xFE]) {
            Some(Bom::Utf16Le)
        } else if input.starts_with(&[0xFE, 0xFF]) {
            Some(Bom::Utf16Be)
        } else {
            None
        }
    }

    /// Human-readable label for diagnostics
    pub fn label(&self) -> &'static str {
        match self {
            Bom::Utf8 => "UTF-8",
            Bom::Utf16Le => "UTF-16 LE",
            Bom::Utf16Be => "UTF-16 BE",
        }
    }
}

/// Encodings the engine accepts in an XML declaration
const SUPPORTED_ENCODINGS: [&str; 4] = ["utf-8", "utf-16", "iso-8859-1", "us-ascii"];

/// Check whether a declared encoding is one the engine supports
pub fn is_supported_encoding(encoding: &str) -> bool {
    let lower = encoding.to_ascii_lowercase();
    SUPPORTED_ENCODINGS.contains(&lower.as_str())
}

/// Extract the declared encoding from XML declaration content
/// (the text between "<?xml" and "?>")
pub fn declared_encoding(declaration: &str) -> Option<String> {
    let idx = declaration.find("encoding")?;
    let rest = &declaration[idx + "encoding".len()..];
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('=')?.trim_start();
    let quote = rest.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let value = &rest[1..];
    let end = value.find(quote)?;
    Some(value[..end].to_string())
}
