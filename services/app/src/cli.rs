//! Command line interface definition

use clap::{Parser, Subcommand};

/// Headless snapfeed client
#[derive(Debug, Parser)]
#[command(name = "snapfeed", version, about)]
pub struct Cli {
    /// Base URL of the REST API
    #[arg(long, global = true, env = "SNAPFEED_API_BASE_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "SNAPFEED_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the session
    Logout,
    /// Show the logged in user
    Whoami,
    /// List the feed, unviewed posts first
    Feed,
    /// Like or unlike a post
    Like { post_id: String },
    /// Comment on a post
    Comment { post_id: String, text: String },
    /// List the comments on a post
    Comments { post_id: String },
    /// List who liked a post
    Likers { post_id: String },
    /// Report a post
    Report {
        post_id: String,
        reason: String,
        #[arg(long)]
        details: Option<String>,
    },
    /// Users suggested to you
    Suggestions,
    /// Users you have chats with
    Chats,
    /// Search users by username
    Search { query: String },
    /// Contact support
    Contact {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
        #[arg(long)]
        email: Option<String>,
    },
}

impl Command {
    /// Whether the command needs a logged in user
    pub fn requires_session(&self) -> bool {
        !matches!(self, Command::Login { .. } | Command::Logout)
    }
}
