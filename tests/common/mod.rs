#![allow(dead_code)]

pub use coderun_test_utils::{init_tracing, with_timeout};
