//! # Input Seam
//!
//! The simulation never polls a device. Each tick it is handed something
//! that answers "is this logical key held?".

/// Keys the avatar controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalKey {
    /// Walk left.
    Left,
    /// Walk right.
    Right,
    /// Jump from the ground.
    Jump,
    /// Float; flies together with `Boost`.
    Float,
    /// Boost; flies together with `Float`.
    Boost,
}

impl LogicalKey {
    /// Every logical key.
    pub const ALL: [Self; 5] = [Self::Left, Self::Right, Self::Jump, Self::Float, Self::Boost];

    #[inline]
    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Anything that can report held keys for the current tick.
pub trait InputSource {
    /// Is `key` held this tick?
    fn is_key_down(&self, key: LogicalKey) -> bool;
}

/// Held keys as a bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct KeyState {
    down: u8,
}

impl KeyState {
    /// Nothing held.
    pub const NONE: Self = Self { down: 0 };

    /// Creates a state with `keys` held.
    #[must_use]
    pub fn with(keys: &[LogicalKey]) -> Self {
        let mut state = Self::NONE;
        for &key in keys {
            state.press(key);
        }
        state
    }

    /// Marks `key` held.
    #[inline]
    pub fn press(&mut self, key: LogicalKey) {
        self.down |= key.bit();
    }

    /// Marks `key` released.
    #[inline]
    pub fn release(&mut self, key: LogicalKey) {
        self.down &= !key.bit();
    }

    /// Sets `key` to `held`.
    #[inline]
    pub fn set(&mut self, key: LogicalKey, held: bool) {
        if held {
            self.press(key);
        } else {
            self.release(key);
        }
    }

    /// `true` when no key is held.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.down == 0
    }
}

impl InputSource for KeyState {
    #[inline]
    fn is_key_down(&self, key: LogicalKey) -> bool {
        self.down & key.bit() != 0
    }
}

/// A timeline of key states: each segment holds its keys for a number of
/// ticks. After the last segment nothing is held.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    /// `(end_tick_exclusive, keys)`, sorted by end tick.
    segments: Vec<(u64, KeyState)>,
    length: u64,
}

impl ScriptedInput {
    /// Creates an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a segment holding `keys` for `ticks` ticks.
    #[must_use]
    pub fn then(mut self, ticks: u64, keys: &[LogicalKey]) -> Self {
        self.length += ticks;
        self.segments.push((self.length, KeyState::with(keys)));
        self
    }

    /// Total scripted ticks.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.length
    }

    /// `true` when the script holds no segments.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Keys held at `tick`.
    #[must_use]
    pub fn state_at(&self, tick: u64) -> KeyState {
        let index = self.segments.partition_point(|&(end, _)| end <= tick);
        self.segments
            .get(index)
            .map_or(KeyState::NONE, |&(_, keys)| keys)
    }

    /// Keys held at `tick`, repeating the script forever.
    #[must_use]
    pub fn looped_at(&self, tick: u64) -> KeyState {
        if self.length == 0 {
            return KeyState::NONE;
        }
        self.state_at(tick % self.length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_state_bits() {
        let mut keys = KeyState::with(&[LogicalKey::Left, LogicalKey::Float]);
        assert!(keys.is_key_down(LogicalKey::Left));
        assert!(keys.is_key_down(LogicalKey::Float));
        assert!(!keys.is_key_down(LogicalKey::Right));

        keys.release(LogicalKey::Left);
        keys.set(LogicalKey::Boost, true);
        assert!(!keys.is_key_down(LogicalKey::Left));
        assert!(keys.is_key_down(LogicalKey::Boost));

        for key in LogicalKey::ALL {
            keys.release(key);
        }
        assert!(keys.is_empty());
    }

    #[test]
    fn test_script_segments() {
        let script = ScriptedInput::new()
            .then(3, &[LogicalKey::Right])
            .then(2, &[LogicalKey::Jump])
            .then(1, &[]);

        assert_eq!(script.len(), 6);
        assert!(script.state_at(0).is_key_down(LogicalKey::Right));
        assert!(script.state_at(2).is_key_down(LogicalKey::Right));
        assert!(script.state_at(3).is_key_down(LogicalKey::Jump));
        assert!(script.state_at(4).is_key_down(LogicalKey::Jump));
        assert!(script.state_at(5).is_empty());
        assert!(script.state_at(100).is_empty());
        assert!(script.looped_at(6).is_key_down(LogicalKey::Right));
    }

    #[test]
    fn test_empty_script() {
        let script = ScriptedInput::new();
        assert!(script.is_empty());
        assert!(script.looped_at(10).is_empty());
    }
}
