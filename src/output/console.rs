//! Console formatting of harvested records
//!
//! Records are written to the log rather than stdout so that `-q` silences
//! them together with everything else.

use crate::crawler::ContentRecord;

/// Number of thumbnail bytes shown in a record preview
pub const THUMBNAIL_PREVIEW_BYTES: usize = 500;

/// Formats a record as a multi-line, human-readable block
pub fn format_record(record: &ContentRecord) -> String {
    let mut out = String::new();

    out.push_str(&format!("url: {}\n", record.url));
    out.push_str(&format!(
        "title: {}\n",
        record.title.as_deref().unwrap_or("-")
    ));
    out.push_str(&format!(
        "description: {}\n",
        record.description.as_deref().unwrap_or("-")
    ));

    match &record.metadata {
        Some(metadata) => out.push_str(&format!(
            "metadata: eid={} cid={}\n",
            metadata.entity_id, metadata.category_id
        )),
        None => out.push_str("metadata: -\n"),
    }

    let bytes = &record.thumbnail.bytes;
    let preview = &bytes[..bytes.len().min(THUMBNAIL_PREVIEW_BYTES)];
    out.push_str(&format!(
        "thumbnail: {} ({} bytes) {}",
        record.thumbnail.url,
        bytes.len(),
        hex::encode(preview)
    ));

    out
}

/// Logs every record of a batch at debug level
pub fn log_records(batch: &[ContentRecord]) {
    for (index, record) in batch.iter().enumerate() {
        tracing::debug!("Record {}:\n{}", index + 1, format_record(record));
    }
}
