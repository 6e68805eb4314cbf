pub mod cookies;
pub mod hash;
pub mod jwt;
