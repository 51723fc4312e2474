use parking_lot::Mutex;
use ulid::{Generator, Ulid};

/// Hands out ULIDs that sort in creation order, even within the same millisecond.
pub(crate) struct IdGenerator {
    generator: Mutex<Generator>,
}

impl IdGenerator {
    pub(crate) fn new() -> Self {
        Self {
            generator: Mutex::new(Generator::new()),
        }
    }

    pub(crate) fn next_id(&self) -> String {
        // overflow of the random part within one millisecond, fall back on a fresh ulid
        self.generator
            .lock()
            .generate()
            .unwrap_or_else(|_| Ulid::new())
            .to_string()
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
