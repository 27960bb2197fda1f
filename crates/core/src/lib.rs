pub mod action;
pub mod config;
pub mod decision;
pub mod error;
pub mod incident;
pub mod text;
pub mod ticket;

pub use action::*;
pub use config::Config;
pub use decision::*;
pub use error::*;
pub use incident::*;
pub use text::truncate_chars;
pub use ticket::*;
