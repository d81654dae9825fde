pub mod account;
pub mod workspace;
