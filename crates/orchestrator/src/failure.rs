//! Mapping of raw provider failure text to user-facing categories.
//!
//! Provider error strings are unbounded and sometimes leak internals, so the
//! persisted `failure_reason` is always one of a small set of messages. The
//! raw detail goes to the logs only.

/// The provider's safety filter declined the content.
pub const REASON_CONTENT_POLICY: &str =
    "The provider declined this content. Adjust the description and try again.";

/// The source image could not be fetched by the provider.
pub const REASON_SOURCE_IMAGE: &str =
    "The source image could not be fetched. Check the image URL and try again.";

/// The provider reported success but no playable video was delivered.
pub const REASON_NO_RESULT: &str =
    "The provider returned no playable video. Your coins have been refunded.";

/// Anything else.
pub const REASON_GENERIC: &str =
    "Video generation failed. Your coins have been refunded, please try again.";

/// Categorize a raw provider failure detail.
pub fn categorize(detail: Option<&str>) -> &'static str {
    let Some(detail) = detail else {
        return REASON_GENERIC;
    };
    let lower = detail.to_lowercase();

    if ["policy", "nsfw", "moderation", "flagged", "unsafe"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        return REASON_CONTENT_POLICY;
    }

    if lower.contains("image")
        && ["fetch", "download", "unreachable", "not found", "invalid"]
            .iter()
            .any(|needle| lower.contains(needle))
    {
        return REASON_SOURCE_IMAGE;
    }

    REASON_GENERIC
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_words_map_to_content_policy() {
        assert_eq!(
            categorize(Some("prompt violates content policy")),
            REASON_CONTENT_POLICY
        );
        assert_eq!(categorize(Some("Flagged by moderation")), REASON_CONTENT_POLICY);
    }

    #[test]
    fn test_image_fetch_errors_map_to_source_image() {
        assert_eq!(
            categorize(Some("source image could not be fetched")),
            REASON_SOURCE_IMAGE
        );
        assert_eq!(
            categorize(Some("input image URL unreachable")),
            REASON_SOURCE_IMAGE
        );
    }

    #[test]
    fn test_everything_else_is_generic() {
        assert_eq!(categorize(Some("GPU worker crashed")), REASON_GENERIC);
        assert_eq!(categorize(None), REASON_GENERIC);
    }
}
