mod helpers;
mod middleware;
mod token;

pub use helpers::{ValidatedToken, extract_token_from_header, validate_token};
pub use middleware::{MaybeAdmin, RequireAdmin, RequireSite};
pub use token::{TokenGenerator, parse_token};
