pub mod auth;
pub mod error;
pub mod extract;
pub mod glucose;
pub mod intent;
pub mod mood;
pub mod session;
pub mod turn;
