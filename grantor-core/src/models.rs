pub mod authorization_code;
pub mod claims;
pub mod client;
pub mod pending_request;

pub use authorization_code::AuthorizationCode;
pub use claims::Claims;
pub use client::{Client, ClientMetadata, RegistrationError, TokenEndpointAuthMethod};
pub use pending_request::PendingRequest;
