//! Utilities.

use std::iter::IntoIterator;

use arrayvec::ArrayVec;

/// Returns floor log2
pub const fn flog2(val: usize) -> usize {
    if val <= 1 {
        0
    } else {
        1 + flog2(val >> 1)
    }
}

/// Returns a mask with the lowest `width` bits set.
pub const fn mask(width: usize) -> u128 {
    if width >= 128 {
        u128::MAX
    } else {
        (1u128 << width) - 1
    }
}

/// Returns bit-represented value of an integer.
pub fn u128_to_bits<const N: usize>(value: u128) -> [bool; N] {
    (0..N)
        .map(|i| if i >= 128 { false } else { ((value >> i) & 1) != 0 })
        .collect::<ArrayVec<bool, N>>()
        .into_inner()
        .unwrap()
}

/// Combines all elements into one String, separated by `sep`. Returns `None` if all elements are `None`.
pub fn join_options<I>(sep: &str, iterable: I) -> Option<String>
where I: IntoIterator<Item = Option<String>> {
    let iterable = iterable.into_iter().flatten().collect::<Vec<_>>();
    if iterable.is_empty() {
        None
    } else {
        Some(iterable.join(sep))
    }
}

/// Some or executing the given expression.
#[macro_export]
macro_rules! some_or {
    ($e:expr, $err:expr) => {{
        match $e {
            Some(r) => r,
            None => $err,
        }
    }};
}
