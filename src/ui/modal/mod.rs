mod config;
mod token_select;

pub use config::{ConfigFormCommand, ConfigModal};
pub use token_select::{TokenModalCommand, TokenSelectModal};
