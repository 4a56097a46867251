//! Core domain concepts shared across all subdomains.
//!
//! - [`clock::Clock`]: injectable time source for governance primitives
//! - [`string::truncate`]: UTF-8 safe truncation for logs and observations

pub mod clock;
pub mod string;
