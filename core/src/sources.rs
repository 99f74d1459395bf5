//! Per-source fetchers. Each source is an independent query against a
//! resolved host; a failure in one never prevents another from running.

pub mod licensing;
pub mod produkey;
pub mod registry;
