pub mod health;
pub mod turn;
