use std::env;

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(default)
}

/// History stores the imported count as a 32-bit integer, so a batch can never
/// be larger than that.
fn batch_size_limit(requested: usize) -> usize {
    requested.clamp(1, i32::MAX as usize)
}

/// Runtime configuration for organization imports.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Largest batch accepted in one call; bigger uploads are refused outright.
    pub max_batch_size: usize,
    /// Also require ratings to be unique across organizations.
    pub unique_rating: bool,
    /// Maximum length, in characters, of a stored history error message.
    pub error_message_limit: usize,
    /// Default page size for history listings.
    pub history_page_size: usize,
    /// Largest upload body read by the import endpoint.
    pub max_payload_bytes: u64,
}

impl ImportConfig {
    pub fn from_env() -> Self {
        Self {
            max_batch_size: batch_size_limit(env_usize("IMPORT_MAX_BATCH_SIZE", 1000)),
            unique_rating: env_bool("IMPORT_UNIQUE_RATING", false),
            error_message_limit: env_usize("IMPORT_ERROR_MESSAGE_LIMIT", 4000).max(16),
            history_page_size: env_usize("IMPORT_HISTORY_PAGE_SIZE", 50).clamp(1, 100),
            max_payload_bytes: env_usize("IMPORT_MAX_PAYLOAD_BYTES", 4 * 1024 * 1024) as u64,
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 1000,
            unique_rating: false,
            error_message_limit: 4000,
            history_page_size: 50,
            max_payload_bytes: 4 * 1024 * 1024,
        }
    }
}
