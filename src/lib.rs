pub mod app;
pub mod cli;
pub mod error;
pub mod export;
pub mod lookup;
pub mod net;
