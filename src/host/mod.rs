pub(crate) mod activation;
pub(crate) mod animate;
pub(crate) mod client;
pub(crate) mod frame;
#[allow(clippy::module_inception)]
pub(crate) mod host;
pub(crate) mod input;
pub(crate) mod memory;
pub(crate) mod top_controls;

#[cfg(test)]
#[path = "../../tests/unit/host/support.rs"]
pub(crate) mod support;
