//! CLI module
//!
//! Command-line interface for collecting one paginated resource per run.
//!
//! # Commands
//!
//! - `posts` - Wall posts, optionally bounded by date
//! - `comments` - Comments under a wall post
//! - `members` - Community members
//! - `followers` - User followers
//! - `likes` - Users who liked an object

mod commands;
mod runner;

pub use commands::{parse_since, Cli, CollectArgs, Commands, OutputFormat};
pub use runner::{summary, Runner};

#[cfg(test)]
mod tests;
