use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Static call-graph extraction for Azure Functions projects
#[derive(Parser, Debug)]
#[command(
    name = "funcgraph",
    about = "Static call-graph extraction for Azure Functions projects",
    version,
    author,
    long_about = "funcgraph discovers every function of an Azure Functions app (JavaScript, \
                  TypeScript, Python or .NET), reads its bindings and infers which functions \
                  start, call, signal or continue which others. Projects can be local paths \
                  or git URLs, including GitHub tree URLs pointing at a subdirectory."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(
        short = 'v',
        long,
        global = true,
        help = "Verbose output (debug logging)"
    )]
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
        about = "Build the function graph of a project",
        long_about = "Locates the project (cloning it first for URLs), catalogues its functions \
                      and prints the resulting function map.\n\n\
                      Examples:\n  \
                      funcgraph traverse .\n  \
                      funcgraph traverse ./my-app --format json\n  \
                      funcgraph traverse https://github.com/org/repo/tree/main/samples/app"
    )]
    Traverse(TraverseArgs),

    #[command(
        about = "Print the function graph as a Mermaid flowchart",
        long_about = "Runs a traversal and renders the function map as Mermaid flowchart text.\n\n\
                      Examples:\n  \
                      funcgraph diagram .\n  \
                      funcgraph diagram ./my-app -o graph.mmd"
    )]
    Diagram(DiagramArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct TraverseArgs {
    #[arg(value_name = "LOCATION", help = "Project path or git URL")]
    pub location: String,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Keep cloned and published temp folders")]
    pub keep_temp: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DiagramArgs {
    #[arg(value_name = "LOCATION", help = "Project path or git URL")]
    pub location: String,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Keep cloned and published temp folders")]
    pub keep_temp: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
