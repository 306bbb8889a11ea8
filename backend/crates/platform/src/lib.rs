//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (HMAC-SHA256 signing, base64url, secure randomness)
//! - Password hashing (Argon2id)
//! - Rate limiting infrastructure

pub mod crypto;
pub mod password;
pub mod rate_limit;
