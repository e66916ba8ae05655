//! Command implementations.

pub mod check;
pub mod config;
pub mod convert;

pub use self::check::execute_check;
pub use self::config::execute_config;
pub use self::convert::{execute_convert, parse_meta_pairs};
