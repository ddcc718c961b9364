pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod pages;
pub mod router;
pub mod service;
pub mod session;
pub mod validation;

pub use error::CoopError;
pub use router::{CoopState, coop_router};
