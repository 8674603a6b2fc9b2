pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{AnalyzeArgs, CliArgs, Commands, ConfigArgs, OperationsArgs};
pub use output::{AnalyzeSummary, OutputFormat, OutputFormatter, ResourceFailure};
