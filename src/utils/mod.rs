// Utility functions

pub mod crypto;
pub mod html;
pub mod logger;

pub use logger::*;
