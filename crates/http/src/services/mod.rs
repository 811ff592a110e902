//! Services backing the HTTP layer

pub mod jwt;

pub use jwt::{Audience, Claims, JwtConfig, JwtService};
