// Library exports for testing
// The binary (main.rs) imports these as well

pub mod error;
pub mod hooks;
pub mod logger;
pub mod surface;

#[cfg(test)]
mod tests;
