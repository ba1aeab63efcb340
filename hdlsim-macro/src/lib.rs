//! Implementation of proc macros on signal types.
//!
//! # Note
//!
//! To use `#[derive(Signal)]` on struct, it is assumed that its `port_decls()` method
//! implementation of `Signal` trait is constructed as struct of its fields.
//!
//! For example, `port_decls()` method implementation of `AxisBeat` struct is as follows.
//!
//! ```ignore
//! #[derive(Debug, Clone, Signal)]
//! pub struct AxisBeat {
//!     tdata: u128,
//!     #[member(name = "")]
//!     tuser: u64,
//!     tlast: bool,
//! }
//!
//! impl Signal for AxisBeat {
//!     ...
//!     fn port_decls() -> PortDecls {
//!         PortDecls::Struct(vec![
//!             (Some("tdata".to_string()), PortDecls::Bits(128)),
//!             (None, PortDecls::Bits(64)),
//!             (Some("tlast".to_string()), PortDecls::Bits(1)),
//!         ])
//!     }
//! }
//! ```

mod signal;
mod utils;

use proc_macro::{self, TokenStream};

#[proc_macro_derive(Signal, attributes(member, width, encode))]
pub fn signal(input: TokenStream) -> TokenStream { signal::derive(input) }
