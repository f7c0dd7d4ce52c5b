//! Tests for `batch`.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::PathBuf;

#[test]
fn cli_parse_batch_defaults() {
    match parse(&["batchdl", "batch", "https://a/1", "https://a/2"]) {
        CliCommand::Batch {
            urls,
            file,
            options,
            jobs,
            passes,
            json,
        } => {
            assert_eq!(urls, vec!["https://a/1", "https://a/2"]);
            assert!(file.is_none());
            assert_eq!(options, "");
            assert!(jobs.is_none());
            assert_eq!(passes, 1);
            assert!(!json);
        }
        _ => panic!("expected Batch"),
    }
}

#[test]
fn cli_parse_batch_all_flags() {
    match parse(&[
        "batchdl",
        "batch",
        "--file",
        "urls.txt",
        "--options",
        "-f best --no-mtime",
        "--jobs",
        "3",
        "--passes",
        "2",
        "--json",
    ]) {
        CliCommand::Batch {
            urls,
            file,
            options,
            jobs,
            passes,
            json,
        } => {
            assert!(urls.is_empty());
            assert_eq!(file, Some(PathBuf::from("urls.txt")));
            assert_eq!(options, "-f best --no-mtime");
            assert_eq!(jobs, Some(3));
            assert_eq!(passes, 2);
            assert!(json);
        }
        _ => panic!("expected Batch with flags"),
    }
}

#[test]
fn cli_parse_batch_short_flags() {
    match parse(&["batchdl", "batch", "-j", "1", "-f", "list", "https://a/1"]) {
        CliCommand::Batch {
            urls, file, jobs, ..
        } => {
            assert_eq!(urls, vec!["https://a/1"]);
            assert_eq!(file, Some(PathBuf::from("list")));
            assert_eq!(jobs, Some(1));
        }
        _ => panic!("expected Batch"),
    }
}

#[test]
fn cli_parse_batch_rejects_non_numeric_jobs() {
    assert!(Cli::try_parse_from(["batchdl", "batch", "--jobs", "many"]).is_err());
}
