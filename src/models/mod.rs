pub mod asset;
pub mod record;
