use crate::envelope::StripPolicy;
use crate::vision::DetectionOperation;
use clap::{Parser, Subcommand, ValueEnum};

/// Fans image analysis results out to a message queue, one envelope per operation
#[derive(Parser, Debug)]
#[command(
    name = "visionpipe",
    about = "Fans image analysis results out to a message queue, one envelope per operation",
    version,
    author,
    long_about = "visionpipe runs detection operations against images through the Google Cloud \
                  Vision API, normalizes each result into a header-enriched JSON envelope and \
                  publishes every envelope as its own message on an Azure Storage queue."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Analyze images and publish one envelope per operation",
        long_about = "Runs the requested detection operations against each resource and \
                      publishes every successful result to the configured queue. A failed \
                      operation is reported and does not stop its siblings.\n\n\
                      Examples:\n  \
                      visionpipe analyze gs://bucket/cat.jpg\n  \
                      visionpipe analyze ./receipt.png -o doc-text -o labels\n  \
                      visionpipe analyze https://example.com/a.jpg --dry-run --format json"
    )]
    Analyze(AnalyzeArgs),

    #[command(about = "List the supported detection operations")]
    Operations(OperationsArgs),

    #[command(
        about = "Show the effective configuration",
        long_about = "Prints the configuration resolved from the environment. Secrets are \
                      shown only as set or not set."
    )]
    Config(ConfigArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(
        value_name = "RESOURCE",
        required = true,
        help = "Image URI (http, https, gs) or local file path"
    )]
    pub resources: Vec<String>,

    #[arg(
        short = 'o',
        long = "operation",
        value_name = "OPERATION",
        default_value = "all",
        help = "Detection operation to run (repeatable, see `visionpipe operations`)"
    )]
    pub operations: Vec<DetectionOperation>,

    #[arg(
        long,
        value_name = "POLICY",
        conflicts_with = "no_strip",
        help = "Whitespace stripping: never, always, except-document-text"
    )]
    pub strip: Option<StripPolicy>,

    #[arg(long, help = "Keep payload whitespace as returned by the service")]
    pub no_strip: bool,

    #[arg(long, value_name = "NAME", help = "Queue to publish to")]
    pub queue: Option<String>,

    #[arg(
        long,
        help = "Publish to an in-process queue and print the envelopes instead"
    )]
    pub dry_run: bool,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(long, value_name = "SECONDS", help = "Request timeout in seconds")]
    pub timeout: Option<u64>,
}

impl AnalyzeArgs {
    /// `--no-strip` is shorthand for `--strip never`
    pub fn strip_override(&self) -> Option<StripPolicy> {
        if self.no_strip {
            Some(StripPolicy::Never)
        } else {
            self.strip
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct OperationsArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_analyze_args() {
        let args = CliArgs::parse_from(["visionpipe", "analyze", "gs://bucket/cat.jpg"]);
        match args.command {
            Commands::Analyze(analyze) => {
                assert_eq!(analyze.resources, vec!["gs://bucket/cat.jpg".to_string()]);
                assert_eq!(analyze.operations, vec![DetectionOperation::All]);
                assert_eq!(analyze.format, OutputFormatArg::Human);
                assert!(analyze.strip_override().is_none());
                assert!(analyze.queue.is_none());
                assert!(!analyze.dry_run);
                assert!(analyze.timeout.is_none());
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_analyze_with_options() {
        let args = CliArgs::parse_from([
            "visionpipe",
            "analyze",
            "a.jpg",
            "b.jpg",
            "-o",
            "doc-text",
            "--operation",
            "DETECT_LABELS",
            "--strip",
            "always",
            "--queue",
            "results",
            "--dry-run",
            "--format",
            "json",
            "--timeout",
            "10",
        ]);

        match args.command {
            Commands::Analyze(analyze) => {
                assert_eq!(analyze.resources.len(), 2);
                assert_eq!(
                    analyze.operations,
                    vec![DetectionOperation::DocumentText, DetectionOperation::Labels]
                );
                assert_eq!(analyze.strip_override(), Some(StripPolicy::Always));
                assert_eq!(analyze.queue.as_deref(), Some("results"));
                assert!(analyze.dry_run);
                assert_eq!(analyze.format, OutputFormatArg::Json);
                assert_eq!(analyze.timeout, Some(10));
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_no_strip_flag() {
        let args = CliArgs::parse_from(["visionpipe", "analyze", "a.jpg", "--no-strip"]);
        match args.command {
            Commands::Analyze(analyze) => {
                assert_eq!(analyze.strip_override(), Some(StripPolicy::Never));
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_strip_conflicts_with_no_strip() {
        let result = CliArgs::try_parse_from([
            "visionpipe",
            "analyze",
            "a.jpg",
            "--strip",
            "always",
            "--no-strip",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_analyze_requires_resource() {
        assert!(CliArgs::try_parse_from(["visionpipe", "analyze"]).is_err());
    }

    #[test]
    fn test_unknown_operation_rejected() {
        let result = CliArgs::try_parse_from(["visionpipe", "analyze", "a.jpg", "-o", "colors"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_operations_command() {
        let args = CliArgs::parse_from(["visionpipe", "operations", "--format", "json"]);
        match args.command {
            Commands::Operations(ops) => assert_eq!(ops.format, OutputFormatArg::Json),
            _ => panic!("Expected Operations command"),
        }
    }

    #[test]
    fn test_config_command() {
        let args = CliArgs::parse_from(["visionpipe", "config"]);
        match args.command {
            Commands::Config(config) => assert_eq!(config.format, OutputFormatArg::Human),
            _ => panic!("Expected Config command"),
        }
    }

    #[test]
    fn test_global_verbose_flag() {
        let args = CliArgs::parse_from(["visionpipe", "-v", "operations"]);
        assert!(args.verbose);
        assert!(!args.quiet);
    }

    #[test]
    fn test_global_quiet_flag() {
        let args = CliArgs::parse_from(["visionpipe", "-q", "operations"]);
        assert!(!args.verbose);
        assert!(args.quiet);
    }

    #[test]
    fn test_log_level_flag() {
        let args = CliArgs::parse_from(["visionpipe", "--log-level", "debug", "config"]);
        assert_eq!(args.log_level, Some("debug".to_string()));
    }
}
