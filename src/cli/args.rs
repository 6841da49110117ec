use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::llm::{ChatModel, CodeTask};
use crate::workflow::GenerateTarget;

#[derive(Parser)]
#[command(name = "softgen")]
#[command(about = "Generate documents and code from prompt templates with DeepSeek and local Ollama models")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.softgen/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a manual and/or source listing with DeepSeek
    Gen {
        /// Software name substituted into the prompt
        #[arg(short, long)]
        name: String,
        /// What to generate
        #[arg(short = 't', long = "type", value_enum)]
        target: GenerateTarget,
        /// Model: 0 | deepseek-chat, 1 | deepseek-reasoner
        #[arg(short, long)]
        model: Option<ChatModel>,
        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Send one prompt to DeepSeek and print the answer
    Ask {
        prompt: String,
        /// Parse the answer as JSON and pretty-print it
        #[arg(long)]
        json: bool,
        /// Stream the completion
        #[arg(long)]
        stream: bool,
        /// Model: 0 | deepseek-chat, 1 | deepseek-reasoner
        #[arg(short, long)]
        model: Option<ChatModel>,
    },
    /// Generate code with the local Ollama model
    Code {
        #[command(subcommand)]
        task: CodeCommand,
        /// Target language
        #[arg(short, long, default_value = "go", global = true)]
        language: String,
        /// Write the code to this file instead of stdout
        #[arg(short, long, global = true)]
        output: Option<PathBuf>,
    },
    /// Chat with the local Ollama model (history is kept in memory only)
    Chat {
        /// Optional system prompt
        #[arg(long)]
        system: Option<String>,
    },
    /// Write the default config and export the built-in templates
    Init,
    /// Show configuration
    Config,
    /// Run diagnostics
    Doctor,
    /// List local Ollama models
    Models,
    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CodeCommand {
    /// A data type with the given fields
    Struct {
        name: String,
        #[arg(short, long)]
        description: String,
        /// Comma-separated field names
        #[arg(short, long, value_delimiter = ',')]
        fields: Vec<String>,
    },
    /// An HTTP handler
    Handler {
        name: String,
        #[arg(long, default_value = "GET")]
        method: String,
        #[arg(long)]
        path: String,
        #[arg(short, long)]
        description: String,
    },
    /// A service interface and implementation
    Service {
        name: String,
        #[arg(short, long)]
        description: String,
        /// Comma-separated method names
        #[arg(long, value_delimiter = ',')]
        methods: Vec<String>,
    },
    /// A data-access layer
    Repository {
        name: String,
        #[arg(short, long)]
        description: String,
        #[arg(long, default_value = "PostgreSQL")]
        database: String,
    },
    /// An HTTP middleware
    Middleware {
        name: String,
        #[arg(short, long)]
        description: String,
    },
    /// Unit tests for a function
    Test {
        function: String,
        #[arg(short, long)]
        description: String,
    },
}

impl From<CodeCommand> for CodeTask {
    fn from(command: CodeCommand) -> Self {
        match command {
            CodeCommand::Struct {
                name,
                description,
                fields,
            } => CodeTask::Struct {
                name,
                description,
                fields,
            },
            CodeCommand::Handler {
                name,
                method,
                path,
                description,
            } => CodeTask::Handler {
                name,
                method,
                path,
                description,
            },
            CodeCommand::Service {
                name,
                description,
                methods,
            } => CodeTask::Service {
                name,
                description,
                methods,
            },
            CodeCommand::Repository {
                name,
                description,
                database,
            } => CodeTask::Repository {
                name,
                description,
                database,
            },
            CodeCommand::Middleware { name, description } => {
                CodeTask::Middleware { name, description }
            }
            CodeCommand::Test {
                function,
                description,
            } => CodeTask::Test {
                function,
                description,
            },
        }
    }
}
