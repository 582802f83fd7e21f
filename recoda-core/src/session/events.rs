use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::traits::capture_delegate::CaptureDelegate;

#[derive(Default)]
struct HubState {
    next_id: u64,
    delegates: Vec<(u64, Arc<dyn CaptureDelegate>)>,
}

/// Fan-out of capture events to every subscribed delegate.
#[derive(Clone, Default)]
pub struct DelegateHub {
    state: Arc<Mutex<HubState>>,
}

impl DelegateHub {
    pub fn subscribe(&self, delegate: Arc<dyn CaptureDelegate>) -> Subscription {
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = state.next_id;
        state.delegates.push((id, delegate));
        Subscription {
            id,
            hub: Arc::downgrade(&self.state),
        }
    }

    /// Deliver an event. Delegates are called outside the hub lock, so they
    /// may subscribe or unsubscribe from inside a callback.
    pub fn emit<F>(&self, event: F)
    where
        F: Fn(&dyn CaptureDelegate),
    {
        let snapshot: Vec<Arc<dyn CaptureDelegate>> =
            self.state.lock().delegates.iter().map(|(_, d)| Arc::clone(d)).collect();
        for delegate in snapshot {
            event(delegate.as_ref());
        }
    }

    pub fn len(&self) -> usize {
        self.state.lock().delegates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle returned by `subscribe`. Unsubscribes on `unsubscribe()` or drop.
#[must_use = "dropping a Subscription unsubscribes the delegate"]
pub struct Subscription {
    id: u64,
    hub: Weak<Mutex<HubState>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.lock().delegates.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::state::CaptureState;
    use crate::test_support::RecordingDelegate;

    #[test]
    fn emit_reaches_subscribers_until_dropped() {
        let hub = DelegateHub::default();
        let first = Arc::new(RecordingDelegate::default());
        let second = Arc::new(RecordingDelegate::default());

        let sub_first = hub.subscribe(first.clone());
        let sub_second = hub.subscribe(second.clone());
        assert_eq!(hub.len(), 2);

        hub.emit(|d| d.on_state_changed(CaptureState::Recording, CaptureState::Idle));
        sub_first.unsubscribe();
        hub.emit(|d| d.on_state_changed(CaptureState::Idle, CaptureState::Recording));

        assert_eq!(first.states(), vec![CaptureState::Recording]);
        assert_eq!(second.states(), vec![CaptureState::Recording, CaptureState::Idle]);

        drop(sub_second);
        assert!(hub.is_empty());
    }

    #[test]
    fn subscription_outliving_hub_is_harmless() {
        let hub = DelegateHub::default();
        let sub = hub.subscribe(Arc::new(RecordingDelegate::default()));
        drop(hub);
        drop(sub);
    }
}
