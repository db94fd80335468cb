use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Session expired, please log in again")]
    Unauthorized,
    #[error("Request failed with status code {0}")]
    Status(u16),
}
