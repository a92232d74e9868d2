use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about = "Chat client for the consular assistant service", long_about = None)]
pub struct Cli {
    /// Base url of the assistant service [env: CONSUL_SERVER_URL]
    #[arg(short, long, global = true)]
    pub server: Option<String>,

    /// Session id sent with every question [env: CONSUL_SESSION_ID]
    #[arg(long, global = true)]
    pub session_id: Option<String>,

    /// Give up on a question after this many seconds; 0 waits forever [env: CONSUL_TIMEOUT_SECS]
    #[arg(short, long, global = true)]
    pub timeout: Option<u64>,

    /// Where the chat screen writes its log [env: CONSUL_LOG_FILE]
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Optional command to run; opens the chat screen when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a single question and print the conversation
    Ask {
        /// The question to send
        #[arg(required = true)]
        question: Vec<String>,
    },

    /// Check that the assistant service is up
    Health,
}
