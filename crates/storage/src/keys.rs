//! Object key layout.
//!
//! ```text
//! generated/{account_id}/{project_id}/{slug}.{ext}   generated flyers
//! projects/{project_id}/{slug}.{ext}                 property image uploads
//! portraits/{account_id}/portrait.{ext}              agent portrait (fixed name, overwritten)
//! ```
//!
//! Slugs are random so repeated uploads never collide; the portrait key is
//! deliberately stable so a new portrait replaces the old object.

use flyerforge_core::types::DbId;
use uuid::Uuid;

pub fn generated_flyer(account_id: DbId, project_id: DbId, extension: &str) -> String {
    format!(
        "generated/{account_id}/{project_id}/{}.{extension}",
        Uuid::new_v4().simple()
    )
}

pub fn property_image(project_id: DbId, extension: &str) -> String {
    format!("projects/{project_id}/{}.{extension}", Uuid::new_v4().simple())
}

pub fn portrait(account_id: DbId, extension: &str) -> String {
    format!("portraits/{account_id}/portrait.{extension}")
}

/// Map a MIME type to the extension used in object keys.
pub fn extension_for_mime(mime: &str) -> &str {
    match mime.split('/').nth(1) {
        Some(ext) if !ext.is_empty() => ext,
        _ => "png",
    }
}
