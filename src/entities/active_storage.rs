//! Attachment bookkeeping rows. Blob contents live elsewhere; only metadata is stored here.

use super::Hooks;
use chrono::NaiveDateTime;

entity! {
    ActiveStorageBlob => "active_storage_blobs", key = id, generated {
        id: i64,
        key: String,
        filename: String,
        content_type: Option<String>,
        metadata: Option<String>,
        byte_size: i64,
        checksum: String,
        created_at: NaiveDateTime,
    }
}

impl Hooks for ActiveStorageBlob {}

entity! {
    ActiveStorageAttachment => "active_storage_attachments", key = id, generated {
        id: i64,
        name: String,
        record_type: String,
        record_id: i64,
        blob_id: i64,
        created_at: NaiveDateTime,
    }
}

impl Hooks for ActiveStorageAttachment {}
