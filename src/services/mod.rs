pub mod auth;
pub mod session;

pub use auth::{
    AuthService, ClientFactory, CredentialsProvider, DefaultClientFactory, StdinCredentialsProvider,
};
pub use session::SessionGuard;
