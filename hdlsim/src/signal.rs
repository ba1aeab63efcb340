//! Bit-representable values.

use std::collections::VecDeque;
use std::fmt::Debug;

use crate::utils::{join_options, u128_to_bits};

/// Bit-representable values.
///
/// Every value carried on a port of a simulated component implements this trait, so that the tracer can record it as
/// a bit vector and name each of its channels.
pub trait Signal: 'static + Debug + Clone {
    /// Signal's bit width.
    ///
    /// # Note
    ///
    /// `Self::WIDTH` and `Self::port_decls().width()` should be equal.
    const WIDTH: usize;

    /// Bit representation, LSB first.
    fn transl(&self) -> Vec<bool>;

    /// Port names and bitwidths.
    ///
    /// A signal is represented by multiple channels combined. `port_decls` stores the name and width information of
    /// these combined channels.
    ///
    /// # Example
    ///
    /// Port declarations of `AxisValid<AxisBeat>` are as follows:
    ///
    /// ```ignore
    /// Struct([
    ///     (Some("tvalid"), Bits(1)),
    ///     (None, Struct([(Some("tdata"), Bits(128)), (Some("tuser"), Bits(64)), ...])),
    /// ])
    /// ```
    fn port_decls() -> PortDecls;
}

/// Port declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortDecls {
    /// Collection of channels.
    Struct(Vec<(Option<String>, PortDecls)>),

    /// Single channel which contains its width.
    Bits(usize),
}

impl PortDecls {
    /// Width of `PortDecls`.
    pub fn width(&self) -> usize {
        match self {
            PortDecls::Struct(inner) => inner.iter().map(|(_, m)| m.width()).sum(),
            PortDecls::Bits(width) => *width,
        }
    }

    /// Iterator for `PortDecls`.
    ///
    /// # Note
    ///
    /// The iterator returns (name, width) for inner fields **ONLY** with nonzero width.
    /// This is to ignore meaningless unit types.
    pub fn iter(&self) -> PortDeclsIterator { self.into_iter() }

    /// Iterator for `PortDecls`, with every name prefixed by `prefix`.
    pub fn iter_with_prefix(&self, prefix: Option<String>) -> PortDeclsIterator {
        let mut iter_vec = vec![];

        match self {
            PortDecls::Struct(inner) => {
                for (name, member) in inner {
                    iter_vec.extend(member.iter_with_prefix(join_options("_", [prefix.clone(), name.clone()])).inner)
                }
            }
            PortDecls::Bits(width) => {
                if *width > 0 {
                    iter_vec.push((prefix, *width));
                }
            }
        }

        PortDeclsIterator { inner: iter_vec.into() }
    }
}

impl IntoIterator for &PortDecls {
    type IntoIter = PortDeclsIterator;
    type Item = (Option<String>, usize);

    fn into_iter(self) -> Self::IntoIter { self.iter_with_prefix(None) }
}

/// Iterator for `PortDecls`.
#[derive(Debug)]
pub struct PortDeclsIterator {
    inner: VecDeque<(Option<String>, usize)>,
}

impl Iterator for PortDeclsIterator {
    type Item = (Option<String>, usize);

    fn next(&mut self) -> Option<Self::Item> { self.inner.pop_front() }
}

impl Signal for () {
    const WIDTH: usize = 0;

    fn transl(&self) -> Vec<bool> { vec![] }

    fn port_decls() -> PortDecls { PortDecls::Bits(0) }
}

impl Signal for bool {
    const WIDTH: usize = 1;

    fn transl(&self) -> Vec<bool> { vec![*self] }

    fn port_decls() -> PortDecls { PortDecls::Bits(1) }
}

macro_rules! impl_signal {
    ($typ:ty) => {
        impl Signal for $typ {
            const WIDTH: usize = ::std::mem::size_of::<$typ>() * 8;

            fn transl(&self) -> Vec<bool> {
                u128_to_bits::<{ ::std::mem::size_of::<$typ>() * 8 }>(u128::from(*self)).to_vec()
            }

            fn port_decls() -> PortDecls { PortDecls::Bits(Self::WIDTH) }
        }
    };
}

impl_signal!(u8);
impl_signal!(u16);
impl_signal!(u32);
impl_signal!(u64);
impl_signal!(u128);

impl<V: Signal> Signal for Option<V> {
    const WIDTH: usize = 1 + V::WIDTH;

    fn transl(&self) -> Vec<bool> {
        match self {
            Some(v) => ::std::iter::once(true).chain(v.transl()).collect(),
            None => vec![false; Self::WIDTH],
        }
    }

    fn port_decls() -> PortDecls {
        PortDecls::Struct(vec![(Some("valid".to_string()), PortDecls::Bits(1)), (None, V::port_decls())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive() {
        assert_eq!(u8::WIDTH, 8);
        assert_eq!(0x81u8.transl(), vec![true, false, false, false, false, false, false, true]);
        assert_eq!(u128::port_decls().width(), 128);
        assert_eq!(().transl(), Vec::<bool>::new());
        assert_eq!(Some(3u8).transl().len(), 9);
        assert_eq!(None::<u8>.transl(), vec![false; 9]);
    }

    #[test]
    fn iter_skips_empty_channels() {
        let decls = PortDecls::Struct(vec![
            (Some("m_axis".to_string()), PortDecls::Struct(vec![(Some("tdata".to_string()), PortDecls::Bits(32))])),
            (Some("tuser".to_string()), PortDecls::Bits(0)),
            (None, PortDecls::Bits(1)),
        ]);
        assert_eq!(decls.width(), 33);
        assert_eq!(decls.iter().collect::<Vec<_>>(), vec![(Some("m_axis_tdata".to_string()), 32), (None, 1)]);
        assert_eq!(
            decls.iter_with_prefix(Some("dma".to_string())).collect::<Vec<_>>(),
            vec![(Some("dma_m_axis_tdata".to_string()), 32), (Some("dma".to_string()), 1)]
        );
    }
}
