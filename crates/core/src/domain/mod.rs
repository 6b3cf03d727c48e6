pub mod news;
pub mod stock;
pub mod symbol;
pub mod user;
