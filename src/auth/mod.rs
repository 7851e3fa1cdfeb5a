mod token_manager;

pub use token_manager::{TokenManager, ACCESS_TOKEN_COOKIE};
