//! JWT access token encoding, decoding, and claims.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::AccessClaims;
pub use decoder::{JwtDecoder, TokenError};
pub use encoder::JwtEncoder;
