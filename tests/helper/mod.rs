#![allow(dead_code)]
// Not every test binary uses all helpers.
#![allow(unused_imports)]
mod wait;

pub use setup::*;
pub use wait::*;

/// A helper function to sleep for ms time.
/// Only used to avoid the boilerplate of importing the same stuff all over the place.
pub fn sleep_ms(ms: u64) {
    std::thread::sleep(std::time::Duration::from_millis(ms));
}
