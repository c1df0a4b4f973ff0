use url::Url;

use crate::config::MediaLocation;

/// Rewrites an object-storage reference (`scheme://bucket/key`) into a
/// directly fetchable HTTP(S) address.
///
/// A reference whose bucket matches the configured one is rebased onto the
/// configured base address; otherwise the generic
/// `https://{bucket}.{storage_host}/{key}` form is produced. References that
/// are already HTTP(S), or that do not parse as `scheme://bucket/key`, pass
/// through unchanged.
pub fn resolve_storage_url(reference: &str, media: &MediaLocation) -> String {
    let Ok(parsed) = Url::parse(reference) else {
        return reference.to_string();
    };
    if matches!(parsed.scheme(), "http" | "https") {
        return reference.to_string();
    }

    let bucket = match parsed.host_str() {
        Some(bucket) if !bucket.is_empty() => bucket,
        _ => return reference.to_string(),
    };
    let key = parsed.path().trim_start_matches('/');
    if key.is_empty() {
        return reference.to_string();
    }

    if let Some(base) = media.base_url.as_deref() {
        if bucket == media.bucket {
            return format!("{}/{}", base.trim_end_matches('/'), key);
        }
    }
    format!("https://{}.{}/{}", bucket, media.storage_host, key)
}
