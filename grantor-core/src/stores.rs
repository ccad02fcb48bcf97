pub mod codes;
pub mod clients;
pub mod requests;

pub use clients::ClientRegistry;
pub use codes::AuthorizationCodeStore;
pub use requests::PendingRequestStore;
