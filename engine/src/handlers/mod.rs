pub mod food;
pub mod general;
pub mod glucose;
pub mod insights;
pub mod login;
pub mod mood;
pub mod plan;
