mod args;
mod commands;
mod output;

pub use args::*;
pub use commands::*;
