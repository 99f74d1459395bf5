pub mod aggregator;
pub mod decoder;
pub mod lease;
pub mod ports;
pub mod sources;
