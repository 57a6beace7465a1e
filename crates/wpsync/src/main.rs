//! `wpsync`: keep a local, file-based mirror of WordPress posts in sync with the site.

/// CLI module - command-line interface for wpsync
mod cli;

/// WordPress REST API gateway
mod rest;

fn main() {
    std::process::exit(cli::run_cli());
}
