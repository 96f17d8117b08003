pub mod files;
pub mod lookup;
pub mod upload;
