pub mod approve;
pub mod authorize;
pub mod errors;
pub mod register;
pub mod token;
