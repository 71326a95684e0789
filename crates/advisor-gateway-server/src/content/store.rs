use advisor_gateway_model::RuleContentDirectory;
use parking_lot::RwLock;
use std::sync::Arc;

/// Holds the currently installed catalog snapshot. Readers clone out an
/// `Arc` to a fully built, immutable directory; `replace` swaps the pointer
/// in one short critical section, so a reader can never observe a torn mix
/// of entries from two fetches. `None` means no fetch has ever succeeded.
#[derive(Default)]
pub struct ContentStore {
    snapshot: RwLock<Option<Arc<RuleContentDirectory>>>,
}

impl ContentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self) -> Option<Arc<RuleContentDirectory>> {
        self.snapshot.read().clone()
    }

    pub fn replace(&self, directory: RuleContentDirectory) {
        *self.snapshot.write() = Some(Arc::new(directory));
    }
}
