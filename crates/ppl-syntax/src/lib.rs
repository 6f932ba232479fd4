pub mod ast;
pub mod config;
pub mod error;
pub mod token;

pub use ast::*;
pub use config::*;
pub use error::*;
pub use token::*;
