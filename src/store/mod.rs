pub mod files;
pub mod lock;
