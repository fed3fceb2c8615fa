//! Usage banner shown when no files are given

use panelpack_core::config::{DEFAULT_CONVERTER, DEFAULT_PACKER_NAME};

const RULE_WIDTH: usize = 60;

/// Print what the tool needs and how to use it
pub fn print_banner() {
    let rule = "=".repeat(RULE_WIDTH);

    println!("{}", rule);
    println!(" Panelpack {} - comic e-book unpack/repack workflow", env!("CARGO_PKG_VERSION"));
    println!("{}", rule);
    println!("Requires:");
    println!("  1. Calibre ({} must be on PATH)", DEFAULT_CONVERTER);
    println!("  2. Kindle Comic Converter ({} in the same folder as this program)", DEFAULT_PACKER_NAME);
    println!();
    println!("Usage:");
    println!("  panelpack <FILE>...");
    println!("  Drop one or more .mobi/.azw3 files onto the program, or pass them as arguments.");
    println!("  Run with --help for all options.");
    println!("{}", rule);
}
