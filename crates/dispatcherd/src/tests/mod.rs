//! Test suites for the dispatcher daemon.

pub(crate) mod support;
