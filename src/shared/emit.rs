use super::events::HistoryChange;
use crate::shared::types::ClipboardEntry;

type Observer = Box<dyn Fn(&HistoryChange, &[ClipboardEntry]) + Send>;

/// Callback registry for history observers.
///
/// Lives inside the serialized clipboard state, so `emit` runs while the state
/// lock is held and every observer sees changes in mutation order. Observers
/// must not call back into the engine.
#[derive(Default)]
pub struct HistoryObservers {
    observers: Vec<Observer>,
}

impl HistoryObservers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, observer: F)
    where
        F: Fn(&HistoryChange, &[ClipboardEntry]) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Notify every observer, in registration order
    pub fn emit(&self, change: &HistoryChange, history: &[ClipboardEntry]) {
        for observer in &self.observers {
            observer(change, history);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_emit_reaches_observers_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut observers = HistoryObservers::new();

        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            observers.register(move |change, history| {
                seen.lock().unwrap().push((tag, change.clone(), history.len()));
            });
        }

        observers.emit(&HistoryChange::Cleared, &[]);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, "first");
        assert_eq!(seen[1].0, "second");
        assert_eq!(seen[0].1, HistoryChange::Cleared);
    }
}
