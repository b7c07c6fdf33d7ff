//! ID generation utilities.

use std::sync::{LazyLock, Mutex, PoisonError};

use ulid::{Generator, Ulid};
use uuid::Uuid;

/// Process-wide generator, monotonic within a millisecond.
static GENERATOR: LazyLock<Mutex<Generator>> = LazyLock::new(|| Mutex::new(Generator::new()));

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// IDs sort in creation order, even within one millisecond, so they
    /// break ties between rows that share a timestamp.
    #[must_use]
    pub fn generate(&self) -> String {
        let ulid = GENERATOR
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generate()
            .unwrap_or_else(|_| Ulid::new());
        ulid.to_string().to_lowercase()
    }

    /// Generate a random session token.
    #[must_use]
    pub fn generate_token(&self) -> String {
        // No time component, unlike IDs
        Uuid::new_v4().simple().to_string()
    }
}
