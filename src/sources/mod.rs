pub mod client;
pub mod iban;
pub mod worldbank;

pub use client::*;
pub use iban::*;
pub use worldbank::*;
