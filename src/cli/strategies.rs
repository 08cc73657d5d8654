//! Handler for the `strategies` command.

use crate::adapter::strategy::AVAILABLE;

/// Print the bundled strategy names.
pub fn execute() {
    println!("Bundled strategies:");
    for name in AVAILABLE {
        println!("  {name}");
    }
}
