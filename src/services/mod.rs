pub mod export;
pub mod recommendations;
