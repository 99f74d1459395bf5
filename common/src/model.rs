pub mod host;
pub mod license;
pub mod record;
