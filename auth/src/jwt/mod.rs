pub mod claims;
pub mod errors;
pub mod handler;

pub use claims::Expiring;
pub use claims::ResetClaims;
pub use claims::SessionClaims;
pub use claims::RESET_TOKEN_TYPE;
pub use errors::JwtError;
pub use handler::JwtHandler;
