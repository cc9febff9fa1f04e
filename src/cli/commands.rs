//! CLI commands and argument parsing

use crate::resource::{ResourceKind, Target};
use crate::types::{parse_param_override, ParamValue, Params};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Collect paginated collections from the VK API
#[derive(Parser, Debug)]
#[command(name = "vk-harvest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Access token
    #[arg(long, global = true, env = "VK_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Directory receiving the collected records
    #[arg(short, long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Summary output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Wall posts of a user or community
    Posts {
        /// Wall owner id (communities are negative)
        #[arg(long, allow_negative_numbers = true)]
        owner_id: Option<i64>,

        /// Short name of the user or community
        #[arg(long)]
        domain: Option<String>,

        /// Stop at posts older than this (YYYY-MM-DD or RFC 3339)
        #[arg(long, value_parser = parse_since)]
        since: Option<DateTime<Utc>>,

        #[command(flatten)]
        collect: CollectArgs,
    },

    /// Comments under a wall post
    Comments {
        /// Wall owner id
        #[arg(long, allow_negative_numbers = true)]
        owner_id: i64,

        /// Post id
        #[arg(long)]
        post_id: i64,

        #[command(flatten)]
        collect: CollectArgs,
    },

    /// Members of a community
    Members {
        /// Community id or short name
        #[arg(long)]
        group_id: String,

        #[command(flatten)]
        collect: CollectArgs,
    },

    /// Followers of a user
    Followers {
        /// User id
        #[arg(long)]
        user_id: i64,

        #[command(flatten)]
        collect: CollectArgs,
    },

    /// Users who liked an object
    Likes {
        /// Object type (post, comment, photo, ...)
        #[arg(long = "type")]
        object_type: String,

        /// Object id
        #[arg(long)]
        item_id: i64,

        /// Object owner id
        #[arg(long, allow_negative_numbers = true)]
        owner_id: Option<i64>,

        #[command(flatten)]
        collect: CollectArgs,
    },
}

/// Options shared by every collection subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct CollectArgs {
    /// Stop after at least this many items (0 = everything)
    #[arg(long, default_value = "0")]
    pub count: u64,

    /// Request extended responses with profiles and groups
    #[arg(long, overrides_with = "no_extended")]
    pub extended: bool,

    /// Request plain responses, even for kinds extended by default
    #[arg(long, overrides_with = "extended")]
    pub no_extended: bool,

    /// Extra request parameter (repeatable)
    #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, ParamValue)>,

    /// Output record name (defaults to kind and identity)
    #[arg(short, long)]
    pub key: Option<String>,
}

impl CollectArgs {
    /// Overrides as a parameter map; later duplicates win
    pub fn overrides(&self) -> Params {
        self.params.iter().cloned().collect()
    }

    /// Extended mode chosen on the command line; `None` keeps the kind's default
    pub fn extended_mode(&self) -> Option<bool> {
        match (self.extended, self.no_extended) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

impl Commands {
    /// Resource kind collected by this subcommand
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Posts { .. } => ResourceKind::Posts,
            Self::Comments { .. } => ResourceKind::Comments,
            Self::Members { .. } => ResourceKind::Members,
            Self::Followers { .. } => ResourceKind::Followers,
            Self::Likes { .. } => ResourceKind::Likes,
        }
    }

    /// Identity of the collection
    pub fn target(&self) -> Target {
        match self {
            Self::Posts {
                owner_id, domain, ..
            } => Target {
                owner_id: *owner_id,
                domain: domain.clone(),
                ..Target::default()
            },
            Self::Comments {
                owner_id, post_id, ..
            } => Target::post(*owner_id, *post_id),
            Self::Members { group_id, .. } => Target::group(group_id),
            Self::Followers { user_id, .. } => Target::user(*user_id),
            Self::Likes {
                object_type,
                item_id,
                owner_id,
                ..
            } => Target {
                owner_id: *owner_id,
                object_type: Some(object_type.clone()),
                item_id: Some(*item_id),
                ..Target::default()
            },
        }
    }

    /// Date cutoff, posts only
    pub fn since(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Posts { since, .. } => *since,
            _ => None,
        }
    }

    /// Shared collection options
    pub fn collect_args(&self) -> &CollectArgs {
        match self {
            Self::Posts { collect, .. }
            | Self::Comments { collect, .. }
            | Self::Members { collect, .. }
            | Self::Followers { collect, .. }
            | Self::Likes { collect, .. } => collect,
        }
    }

    /// Output record name: `--key`, or kind and identity joined by `_`
    pub fn output_key(&self) -> String {
        if let Some(key) = &self.collect_args().key {
            return key.clone();
        }
        let kind = self.kind();
        let target = self.target();
        let parts: Vec<String> = match self {
            Self::Posts { .. } => vec![target
                .owner_id
                .map(|id| id.to_string())
                .or(target.domain)
                .unwrap_or_default()],
            Self::Comments { owner_id, post_id, .. } => {
                vec![owner_id.to_string(), post_id.to_string()]
            }
            Self::Members { group_id, .. } => vec![group_id.clone()],
            Self::Followers { user_id, .. } => vec![user_id.to_string()],
            Self::Likes {
                object_type,
                item_id,
                owner_id,
                ..
            } => {
                let mut parts = vec![object_type.clone()];
                parts.extend(owner_id.map(|id| id.to_string()));
                parts.push(item_id.to_string());
                parts
            }
        };
        format!("{kind}_{}", parts.join("_"))
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Single-line JSON summary
    Json,
    /// Indented JSON summary
    Pretty,
}

/// Parse `YYYY-MM-DD` (start of day, UTC) or an RFC 3339 timestamp
pub fn parse_since(input: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{input}': {e}"))?;
    let datetime = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| format!("invalid date '{input}'"))?;
    Ok(datetime.and_utc())
}

fn parse_param(input: &str) -> Result<(String, ParamValue), String> {
    parse_param_override(input).ok_or_else(|| format!("expected KEY=VALUE, got '{input}'"))
}
