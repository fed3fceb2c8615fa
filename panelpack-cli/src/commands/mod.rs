//! CLI command implementations

mod banner;
mod process;

pub use banner::print_banner;
pub use process::process;
