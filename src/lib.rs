#![doc = include_str!("RUSTDOC.md")]

pub mod platform;
pub mod push;

#[cfg(test)]
pub mod test_support;
