//! The Glow Stick effect.
//!
//! A fixed pool of nodes is created once; every parameter change selects a
//! blend variant, decides which light stages are bypassed, relinks the chain
//! and forwards the meta-parameters to the internal nodes.

pub mod params;
pub mod pool;
pub mod selector;
pub mod bypass;
pub mod redirect;
pub mod chain;
pub mod assembler;

pub use assembler::{AssemblyState, Glowstick};
pub use bypass::{resolve_bypass, BypassState};
pub use chain::Chain;
pub use params::{BlendMode, MetaParams};
pub use pool::NodePool;
pub use redirect::{apply_redirections, Redirection, RedirectTarget, REDIRECTIONS};
pub use selector::{select_blend, select_blend_raw};
