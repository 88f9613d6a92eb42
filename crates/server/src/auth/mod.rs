//! Bearer/cookie authentication. Tokens are issued by the identity provider;
//! this crate only validates them and maps claims to a [`shared_types::CallerContext`].

pub mod cookies;
pub mod extractors;
pub mod jwt;
pub mod middleware;
