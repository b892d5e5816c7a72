//! Command handlers grouped by concern.

pub(crate) mod hash;
pub(crate) mod locks;
pub(crate) mod publish;
