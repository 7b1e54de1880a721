//! Modifier-key gesture tracking.

/// Keys the preview layer cares about. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Shift,
    Alt,
    Control,
    Escape,
    Other,
}

/// Tracks whether the interception modifier is currently held.
///
/// Last event wins; auto-repeated key-down events leave the state unchanged.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    modifier: Key,
    active: bool,
}

impl GestureTracker {
    pub fn new(modifier: Key) -> Self {
        Self {
            modifier,
            active: false,
        }
    }

    pub fn modifier(&self) -> Key {
        self.modifier
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn on_key_down(&mut self, key: Key) {
        if key == self.modifier {
            self.active = true;
        }
    }

    pub fn on_key_up(&mut self, key: Key) {
        if key == self.modifier {
            self.active = false;
        }
    }

    /// Force the gesture off regardless of which key arrived.
    pub fn release(&mut self) {
        self.active = false;
    }
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new(Key::Shift)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_key_down_stays_active() {
        let mut g = GestureTracker::default();
        g.on_key_down(Key::Shift);
        g.on_key_down(Key::Shift);
        assert!(g.is_active());
        g.on_key_up(Key::Shift);
        assert!(!g.is_active());
    }

    #[test]
    fn other_keys_ignored() {
        let mut g = GestureTracker::default();
        g.on_key_down(Key::Alt);
        assert!(!g.is_active());
        g.on_key_down(Key::Shift);
        g.on_key_up(Key::Other);
        g.on_key_up(Key::Escape);
        assert!(g.is_active());
        g.release();
        assert!(!g.is_active());
    }

    #[test]
    fn custom_modifier() {
        let mut g = GestureTracker::new(Key::Alt);
        g.on_key_down(Key::Shift);
        assert!(!g.is_active());
        g.on_key_down(Key::Alt);
        assert!(g.is_active());
    }
}
