//! CLI command handlers, one file per command.

mod checksum;
mod get;
mod list;

pub use checksum::run_checksum;
pub use get::run_get;
pub use list::run_list;
