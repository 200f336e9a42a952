pub mod claims;
pub mod errors;
pub mod handler;
pub mod tokens;

pub use claims::IdentityClaims;
pub use errors::JwtError;
pub use handler::JwtHandler;
pub use tokens::IssuedToken;
pub use tokens::TokenService;
pub use tokens::BEARER;
