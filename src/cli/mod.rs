pub mod commands;
pub mod handlers;
pub mod output;
pub mod spinner;

pub use commands::{CliArgs, Commands, DiagramArgs, TraverseArgs};
pub use output::{OutputFormat, OutputFormatter};
pub use spinner::SpinnerHandler;
