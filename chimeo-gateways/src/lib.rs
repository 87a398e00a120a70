pub mod json_store;
pub mod opencage;
