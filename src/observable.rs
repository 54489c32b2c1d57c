use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<T> = Box<dyn Fn(&T)>;

/// A value holder that notifies subscribers whenever the value changes.
///
/// Writers call [`Observable::set`]; readers either poll [`Observable::get`]
/// or subscribe and derive what they need from the value they are handed.
pub struct Observable<T> {
    value: T,
    version: u64,
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener<T>)>,
}

impl<T: Clone + PartialEq> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            version: 0,
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    pub fn get(&self) -> T {
        self.value.clone()
    }

    /// Incremented on every change; lets pollers skip unchanged frames.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Stores `value` and notifies listeners. Returns `false` without
    /// notifying when the value is unchanged.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        self.version = self.version.wrapping_add(1);
        for (_, listener) in &self.listeners {
            listener(&self.value);
        }
        true
    }

    pub fn subscribe(&mut self, listener: impl Fn(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("version", &self.version)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
