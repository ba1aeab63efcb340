//! Utilities for valid-ready channels.

use hdlsim_macro::Signal;

use crate::*;

/// Returns whether a transfer happens on a valid-ready channel in this cycle.
pub fn accepted(valid: bool, ready: bool) -> bool { valid & ready }

/// Valid/ready channel's forward signals.
#[derive(Debug, Default, Clone, PartialEq, Eq, Signal)]
pub struct Valid<V: Signal> {
    /// Inner data
    #[member(name = "")]
    pub inner: V,

    /// Valid bit
    pub valid: bool,
}

impl<V: Signal> Valid<V> {
    /// Creates a new value.
    pub fn new(valid: bool, inner: V) -> Self { Self { inner, valid } }

    /// Creates a valid value.
    pub fn valid(inner: V) -> Self { Self::new(true, inner) }

    /// Maps the inner value.
    pub fn map_inner<W: Signal, F: FnOnce(V) -> W>(self, f: F) -> Valid<W> {
        Valid { inner: f(self.inner), valid: self.valid }
    }

    /// Returns whether the value is transferred given the consumer's `ready`.
    pub fn accepted(&self, ready: bool) -> bool { accepted(self.valid, ready) }
}

impl<V: Signal + Default> Valid<V> {
    /// Creates an invalid value.
    pub fn invalid() -> Self { Self::default() }
}

/// Ready signal.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Signal)]
pub struct Ready {
    /// Ready bit
    pub ready: bool,
}

impl Ready {
    /// Creates a new value.
    pub fn new(ready: bool) -> Self { Self { ready } }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_names() {
        let names = Valid::<u32>::port_decls().iter().collect::<Vec<_>>();
        assert_eq!(names, vec![(None, 32), (Some("valid".to_string()), 1)]);
        assert_eq!(Valid::<u32>::WIDTH, 33);
    }

    #[test]
    fn handshake() {
        let v = Valid::valid(3u8);
        assert!(v.accepted(true));
        assert!(!v.accepted(false));
        assert!(!Valid::<u8>::invalid().accepted(true));
        assert_eq!(v.map_inner(|x| u16::from(x) << 8).inner, 0x300);
    }
}
