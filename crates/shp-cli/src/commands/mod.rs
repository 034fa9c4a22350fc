pub mod canonicalize;
pub mod keygen;
pub mod sign;
pub mod verify;

use std::io::Read;

/// Reads an input file, or stdin when no path is given.
pub fn read_input(path: Option<&str>) -> Result<String, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
