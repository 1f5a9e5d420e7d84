//! Supported conversion format tables.
//!
//! The remote worker imports a fixed set of office-document formats and
//! exports exactly one: PDF. The tables are module-level constants, never
//! mutated after initialisation.

/// Importable source formats and their MIME types, in the order the worker
/// advertises them.
pub const IMPORT_FORMATS: &[(&str, &str)] = &[
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("rtf", "application/rtf"),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("ppt", "application/vnd.ms-powerpoint"),
    ("pptx", "application/vnd.ms-powerpoint"),
    ("html", "text/html"),
    ("odt", "application/vnd.oasis.opendocument.text"),
    ("ods", "application/vnd.oasis.opendocument.spreadsheet"),
];

/// Exportable target formats and their MIME types.
pub const EXPORT_FORMATS: &[(&str, &str)] = &[("pdf", "application/pdf")];

/// MIME type for an importable extension, if supported.
pub fn import_mime(extension: &str) -> Option<&'static str> {
    let extension = extension.to_lowercase();
    IMPORT_FORMATS
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
}

/// MIME type for an exportable extension, if supported.
pub fn export_mime(extension: &str) -> Option<&'static str> {
    let extension = extension.to_lowercase();
    EXPORT_FORMATS
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
}

/// Whether a conversion from `from` to `to` can be completed by the remote
/// worker. Case-insensitive on both extensions.
pub fn supports(from: &str, to: &str) -> bool {
    import_mime(from).is_some() && export_mime(to).is_some()
}

/// The supported conversions as a human-readable list.
pub fn supported_conversions() -> String {
    let mut extensions: Vec<&str> = IMPORT_FORMATS.iter().map(|(ext, _)| *ext).collect();
    extensions.extend(EXPORT_FORMATS.iter().map(|(ext, _)| *ext));
    extensions.join(", ")
}
