use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use wpsync_core::post::PostId;

/// Mirror WordPress posts to local files and keep both sides in sync.
#[derive(Parser, Debug)]
#[command(name = "wpsync", version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one synchronization pass against the site
    Sync {
        /// Cache directory (overrides config)
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Posts fetched per status, 1-100 (overrides config)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
        limit: Option<u32>,
    },

    /// Show which cached posts have local edits, without contacting the site
    Status {
        /// Cache directory (overrides config)
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },

    /// Work with posts on the site directly
    Posts {
        #[command(subcommand)]
        command: PostsCommands,
    },

    /// Inspect the local cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum PostsCommands {
    /// List one page of posts
    List {
        /// Status to list
        #[arg(long, default_value = "publish")]
        status: String,

        /// Posts per page, 1-100
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=100))]
        per_page: u32,

        /// Page number, from 1
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },

    /// Show one post
    Get {
        /// Post id
        id: PostId,
    },

    /// Create a post and add it to the cache
    Create {
        /// Title
        #[arg(long)]
        title: String,

        #[command(flatten)]
        body: BodyArgs,

        /// Initial status
        #[arg(long, default_value = "draft")]
        status: String,

        #[command(flatten)]
        terms: TermArgs,

        /// Cache directory (overrides config)
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },

    /// Change fields of a post on the site
    Update {
        /// Post id
        id: PostId,

        /// New title
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        body: BodyArgs,

        /// New status
        #[arg(long)]
        status: Option<String>,

        #[command(flatten)]
        terms: TermArgs,
    },

    /// Delete a post (permanently unless --trash)
    Delete {
        /// Post id
        id: PostId,

        /// Move to the trash instead
        #[arg(long)]
        trash: bool,
    },
}

/// Body given inline or read from a file.
#[derive(Args, Debug)]
pub struct BodyArgs {
    /// Body text
    #[arg(long, conflicts_with = "content_file")]
    pub content: Option<String>,

    /// Read the body from this file
    #[arg(long)]
    pub content_file: Option<PathBuf>,
}

/// Taxonomy and media references.
#[derive(Args, Debug)]
pub struct TermArgs {
    /// Category ids, comma separated
    #[arg(long, value_delimiter = ',')]
    pub categories: Vec<u64>,

    /// Tag ids, comma separated
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<u64>,

    /// Attachment id of the featured image
    #[arg(long)]
    pub featured_media: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// List cached posts
    List {
        /// Cache directory (overrides config)
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },

    /// Show the files and baseline of one cached post
    Show {
        /// Post id
        id: PostId,

        /// Cache directory (overrides config)
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a new config file
    Init {
        /// REST root, e.g. https://example.com/wp-json/wp/v2
        #[arg(long)]
        base_url: String,

        /// Cache directory (defaults to the platform cache dir)
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Bearer token stored in the config (WPSYNC_TOKEN overrides it)
        #[arg(long)]
        token: Option<String>,
    },

    /// Print the current config
    Show,
}
