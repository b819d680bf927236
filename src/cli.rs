use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mirage")]
#[command(
    version,
    about = "Mirage - extract a website's brand identity and generate matching HTML/CSS",
    long_about = "Mirage\n\nModes:\n- serve: run the MCP tool server over stdin/stdout (default).\n- tools: print the tool catalogue with input schemas.\n- call: invoke a single tool once and print its JSON result.\n\nCredentials come from FIRECRAWL_API_KEY and GOOGLE_API_KEY (or the config file)."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(long, global = true, help = "Enable debug logging on stderr")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Config file (TOML); defaults to ~/.config/mirage/config.toml when present"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Clone, Default)]
pub enum Commands {
    /// Serve the MCP tools over stdio
    #[default]
    Serve,

    /// Print the tool catalogue
    Tools {
        #[arg(long, value_enum, default_value = "pretty", help = "Output format")]
        format: OutputFormat,
    },

    /// Invoke one tool and print its result
    Call {
        #[arg(help = "Tool name (extract_brand, generate_replica, replicate_website, compare_brands, apply_brand_to_template)")]
        tool: String,

        #[arg(
            long,
            value_name = "JSON",
            default_value = "{}",
            conflicts_with = "args_file",
            help = "Tool arguments as a JSON object"
        )]
        args: String,

        #[arg(long, value_name = "PATH", help = "Read tool arguments from a JSON file")]
        args_file: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Pretty,
}

pub fn parse() -> Cli {
    Cli::parse()
}
