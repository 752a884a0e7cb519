//! Resource resolution, I/O, and target derivation tests

pub mod tests_convert;
