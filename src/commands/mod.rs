pub mod admin;
pub mod claim;
pub mod confirm;
pub mod feed;
pub mod init;
pub mod release;
pub mod reset;
pub mod status;
pub mod watch;
