mod args;

pub use args::{CheckArgs, CheckCommand, Cli};
