use chrono::{DateTime, Utc};

/// The currently publishable exposition document
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub rendered_text: String,
    pub generated_at: DateTime<Utc>,
}

impl Snapshot {
    /// Create a new snapshot
    pub fn new(rendered_text: String, generated_at: DateTime<Utc>) -> Self {
        Self {
            rendered_text,
            generated_at,
        }
    }

    /// Placeholder held by the cache before the first refresh completes
    pub fn uninitialized() -> Self {
        Self {
            rendered_text: String::new(),
            generated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.generated_at != DateTime::<Utc>::UNIX_EPOCH || !self.rendered_text.is_empty()
    }

    /// Timestamp published as the last_check gauge
    pub fn epoch_seconds(&self) -> i64 {
        self.generated_at.timestamp()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::uninitialized()
    }
}
