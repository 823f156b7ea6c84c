pub mod walker;

pub use walker::FileWalker;

use std::fs;
use std::path::Path;

pub fn read_file(path: &Path) -> std::io::Result<String> {
    fs::read_to_string(path)
}
