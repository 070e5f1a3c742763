use std::{
    collections::HashMap,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc, RwLock, Weak,
        atomic::{AtomicU64, Ordering},
    },
};

use super::events::{EventKind, Notification};

type Callback = Arc<dyn Fn(&Notification) + Send + Sync>;

struct Registration {
    id: u64,
    callback: Callback,
}

#[derive(Default)]
struct BusInner {
    listeners: RwLock<HashMap<EventKind, Vec<Registration>>>,
    next_id: AtomicU64,
}

/// Named-event fan-out with per-event listener lists.
///
/// Emission is synchronous and in registration order. A panicking listener
/// is caught and logged; it never stops the remaining listeners and never
/// reaches the emitter's caller.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(
        &self,
        kind: EventKind,
        callback: impl Fn(&Notification) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let mut listeners = self.inner.listeners.write().unwrap();
        listeners.entry(kind).or_default().push(Registration {
            id,
            callback: Arc::new(callback),
        });
        Subscription {
            bus: Arc::downgrade(&self.inner),
            kind,
            id,
        }
    }

    pub fn emit(&self, kind: EventKind, payload: &Notification) {
        // Snapshot the list so listeners may subscribe or unsubscribe
        // while the round is running.
        let callbacks: Vec<Callback> = {
            let listeners = self.inner.listeners.read().unwrap();
            listeners
                .get(&kind)
                .map(|regs| regs.iter().map(|r| r.callback.clone()).collect())
                .unwrap_or_default()
        };

        for callback in callbacks {
            if catch_unwind(AssertUnwindSafe(|| callback(payload))).is_err() {
                tracing::error!(event = %kind, "event listener panicked");
            }
        }
    }
}

/// Handle returned by [`EventBus::on`]; removes exactly that registration.
pub struct Subscription {
    bus: Weak<BusInner>,
    kind: EventKind,
    id: u64,
}

impl Subscription {
    /// Safe to call once; a second call is a no-op.
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.bus.upgrade() {
            let mut listeners = inner.listeners.write().unwrap();
            if let Some(regs) = listeners.get_mut(&self.kind) {
                regs.retain(|r| r.id != self.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn payload() -> Notification {
        Notification::Initialized
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let order = order.clone();
            let _ = bus.on(EventKind::AppInitialized, move |_| {
                order.lock().unwrap().push(label);
            });
        }
        bus.emit(EventKind::AppInitialized, &payload());

        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn a_panicking_listener_does_not_stop_the_round() {
        let bus = EventBus::new();
        let reached = Arc::new(Mutex::new(false));

        let _a = bus.on(EventKind::AppInitialized, |_| {
            panic!("listener failure");
        });
        let flag = reached.clone();
        let _b = bus.on(EventKind::AppInitialized, move |_| {
            *flag.lock().unwrap() = true;
        });

        bus.emit(EventKind::AppInitialized, &payload());
        assert!(*reached.lock().unwrap());
    }

    #[test]
    fn unsubscribe_removes_only_its_registration() {
        let bus = EventBus::new();
        let hits = Arc::new(Mutex::new(Vec::new()));

        let first_hits = hits.clone();
        let first = bus.on(EventKind::AppInitialized, move |_| {
            first_hits.lock().unwrap().push("first");
        });
        let second_hits = hits.clone();
        let _second = bus.on(EventKind::AppInitialized, move |_| {
            second_hits.lock().unwrap().push("second");
        });

        first.unsubscribe();
        bus.emit(EventKind::AppInitialized, &payload());

        assert_eq!(*hits.lock().unwrap(), vec!["second"]);
    }

    #[test]
    fn events_are_isolated_per_kind() {
        let bus = EventBus::new();
        let hits = Arc::new(Mutex::new(0));

        let seen = hits.clone();
        let _ = bus.on(EventKind::PlaylistChanged, move |_| {
            *seen.lock().unwrap() += 1;
        });

        bus.emit(EventKind::AppInitialized, &payload());
        assert_eq!(*hits.lock().unwrap(), 0);
    }
}
