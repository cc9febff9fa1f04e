//! Tests for CLI module

use super::*;
use crate::engine::{Collection, CollectionStats, RunState, StopReason};
use crate::pagination::Aggregate;
use crate::resource::{ResourceKind, Target};
use crate::types::ParamValue;
use chrono::{TimeZone, Utc};
use clap::Parser;
use std::path::Path;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("vk-harvest").chain(args.iter().copied())).unwrap()
}

// ============================================================================
// Argument Parsing Tests
// ============================================================================

#[test]
fn test_parse_posts_by_owner() {
    let cli = parse(&["posts", "--owner-id", "-1", "--count", "250"]);
    let command = &cli.command;

    assert_eq!(command.kind(), ResourceKind::Posts);
    assert_eq!(command.target(), Target::owner(-1));
    assert_eq!(command.collect_args().count, 250);
    assert!(command.since().is_none());
    assert_eq!(command.output_key(), "posts_-1");
    assert_eq!(cli.format, OutputFormat::Json);
}

#[test]
fn test_parse_posts_by_domain_with_since() {
    let cli = parse(&["posts", "--domain", "apiclub", "--since", "2024-03-01"]);
    assert_eq!(cli.command.target(), Target::domain("apiclub"));
    assert_eq!(
        cli.command.since(),
        Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
    );
    assert_eq!(cli.command.output_key(), "posts_apiclub");
}

#[test]
fn test_parse_global_flags_after_subcommand() {
    let cli = parse(&[
        "members",
        "--group-id",
        "apiclub",
        "--output-dir",
        "/tmp/out",
        "--format",
        "pretty",
        "-v",
    ]);
    assert_eq!(cli.output_dir.as_deref(), Some(Path::new("/tmp/out")));
    assert_eq!(cli.format, OutputFormat::Pretty);
    assert!(cli.verbose);
    assert_eq!(cli.command.output_key(), "members_apiclub");
}

#[test]
fn test_parse_params_and_key() {
    let cli = parse(&[
        "followers",
        "--user-id",
        "1",
        "-p",
        "name_case=gen",
        "--param",
        "offset_hint=5",
        "--key",
        "durov",
    ]);
    let overrides = cli.command.collect_args().overrides();
    assert_eq!(overrides.get("name_case"), Some(&ParamValue::from("gen")));
    assert_eq!(overrides.get("offset_hint"), Some(&ParamValue::Int(5)));
    assert_eq!(cli.command.output_key(), "durov");
}

#[test]
fn test_parse_rejects_malformed_param() {
    let result = Cli::try_parse_from(["vk-harvest", "members", "--group-id", "1", "-p", "novalue"]);
    assert!(result.is_err());
}

#[test]
fn test_parse_likes() {
    let cli = parse(&[
        "likes", "--type", "post", "--owner-id", "-1", "--item-id", "42", "--extended",
    ]);
    assert_eq!(cli.command.target(), Target::liked("post", -1, 42));
    assert_eq!(cli.command.collect_args().extended_mode(), Some(true));
    assert_eq!(cli.command.output_key(), "likes_post_-1_42");
}

#[test]
fn test_parse_extended_mode() {
    let cli = parse(&["comments", "--owner-id", "-1", "--post-id", "10"]);
    assert_eq!(cli.command.collect_args().extended_mode(), None);

    let cli = parse(&["comments", "--owner-id", "-1", "--post-id", "10", "--no-extended"]);
    assert_eq!(cli.command.collect_args().extended_mode(), Some(false));

    // Last flag wins
    let cli = parse(&[
        "comments", "--owner-id", "-1", "--post-id", "10", "--no-extended", "--extended",
    ]);
    assert_eq!(cli.command.collect_args().extended_mode(), Some(true));
}

#[test]
fn test_parse_comments() {
    let cli = parse(&["comments", "--owner-id", "-1", "--post-id", "10"]);
    assert_eq!(cli.command.kind(), ResourceKind::Comments);
    assert_eq!(cli.command.target(), Target::post(-1, 10));
    assert_eq!(cli.command.output_key(), "comments_-1_10");
}

#[test]
fn test_since_only_on_posts() {
    let result = Cli::try_parse_from([
        "vk-harvest",
        "members",
        "--group-id",
        "1",
        "--since",
        "2024-01-01",
    ]);
    assert!(result.is_err());
}

// ============================================================================
// Date Parsing Tests
// ============================================================================

#[test]
fn test_parse_since_formats() {
    assert_eq!(
        parse_since("2024-01-15").unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
    );
    assert_eq!(
        parse_since("2024-01-15T12:30:00+03:00").unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap()
    );
    assert!(parse_since("15.01.2024").is_err());
}

// ============================================================================
// Summary Tests
// ============================================================================

#[test]
fn test_summary() {
    let collection = Collection {
        kind: ResourceKind::Posts,
        state: RunState::Partial,
        stop_reason: StopReason::RemoteError,
        aggregate: Aggregate::new(false),
        error: Some(crate::error::Error::remote(6, "flood")),
        stats: CollectionStats::default(),
    };

    let value = summary("posts_-1", Path::new("out/posts_-1.json"), &collection);
    assert_eq!(value["state"], "partial");
    assert_eq!(value["stop_reason"], "remote_error");
    assert_eq!(value["path"], "out/posts_-1.json");
    assert_eq!(value["loaded_count"], 0);
    assert_eq!(value["error"], "Remote error 6: flood");
}
