pub mod config;
pub mod debugger;
pub mod log;
pub mod mi;
pub mod process;
pub mod version;
