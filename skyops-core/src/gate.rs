use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Process-wide mutation lock. Clones share the same lock.
#[derive(Clone, Default)]
pub struct WriteGate(Arc<Mutex<()>>);

impl WriteGate {
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.0.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clones_share_the_lock() {
        let gate = WriteGate::default();
        let other = gate.clone();

        let guard = gate.lock().await;
        assert!(other.0.try_lock().is_err());
        drop(guard);
        assert!(other.0.try_lock().is_ok());
    }
}
