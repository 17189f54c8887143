//! Command-line surface.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "memo")]
#[command(version, about = "Memo Life For You", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a memo
    #[command(visible_alias = "n")]
    New {
        /// Title of the memo; prompted for when omitted
        title: Option<String>,
    },

    /// List memos
    #[command(visible_alias = "l")]
    List {
        /// Print full paths
        #[arg(long)]
        fullpath: bool,

        /// Print each memo with a template, e.g. '{{.File}} {{.Title}}'
        #[arg(long)]
        format: Option<String>,

        /// Only memos whose file name contains this text
        pattern: Option<String>,
    },

    /// Edit a memo
    #[command(visible_alias = "e")]
    Edit {
        /// File name under the memo directory; selected interactively when omitted
        file: Option<String>,
    },

    /// View memos
    #[command(visible_alias = "v")]
    Cat {
        /// File name under the memo directory; selected interactively when omitted
        file: Option<String>,
    },

    /// Delete memos whose file name contains the pattern
    #[command(visible_alias = "d")]
    Delete { pattern: Option<String> },

    /// Search memos with the configured grep command
    #[command(visible_alias = "g")]
    Grep { pattern: Option<String> },

    /// Edit the config file
    #[command(visible_alias = "c")]
    Config {
        /// Print the config file instead
        #[arg(long)]
        cat: bool,
    },

    /// Serve memos over HTTP
    #[command(visible_alias = "s")]
    Serve {
        /// Address to listen on
        #[arg(long, default_value = crate::serve::DEFAULT_ADDR)]
        addr: String,
    },

    /// A plugin from the plugins directory
    #[command(external_subcommand)]
    Plugin(Vec<String>),
}
