//! Platform glue shared by the push components.

pub mod runtime;

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
pub mod browser;
