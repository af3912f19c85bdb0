//! Integration tests for the external skip list command.
//!
//! A small shell script stands in for `mythutil`.

#![cfg(unix)]

mod common;

use common::recording;
use mythlink::error::SkipListError;
use mythlink::generators::sidecar::write_sidecar;
use mythlink::models::config::SkipListConfig;
use mythlink::models::skiplist::SkipRange;
use mythlink::services::skiplist::CommandSkipList;
use mythlink::services::SkipListSource;
use std::fs;
use tempfile::TempDir;

fn shell(script: &str) -> CommandSkipList {
    CommandSkipList::new(&SkipListConfig {
        enabled: true,
        program: "sh".to_string(),
        args: vec!["-c".to_string(), script.to_string(), "mythutil".to_string()],
    })
}

#[tokio::test]
async fn test_command_output_is_parsed() {
    let source = shell("echo 'Commercial Skip List: 10-20,300-450'");

    let list = source.skip_list(&recording(1051, "Dexter", 3, 7)).await.unwrap();

    assert_eq!(
        list.ranges,
        vec![SkipRange { start: 10, end: 20 }, SkipRange { start: 300, end: 450 }]
    );
}

#[tokio::test]
async fn test_command_receives_recording_identity() {
    // $1..$4 are --chanid <id> --starttime <ts>.
    let source = shell("test \"$2\" = 1051 && test \"$4\" = 20240309205100 && echo 'Commercial Skip List: 1-2'");

    let list = source.skip_list(&recording(1051, "Dexter", 3, 7)).await.unwrap();
    assert_eq!(list.ranges.len(), 1);
}

#[tokio::test]
async fn test_command_failure() {
    let source = shell("exit 3");

    let result = source.skip_list(&recording(1051, "Dexter", 3, 7)).await;
    assert!(matches!(result, Err(SkipListError::ExitStatus { .. })));
}

#[tokio::test]
async fn test_command_garbage_output() {
    let source = shell("echo 'Unable to find recording'");

    let result = source.skip_list(&recording(1051, "Dexter", 3, 7)).await;
    assert!(matches!(result, Err(SkipListError::Malformed(_))));
}

#[tokio::test]
async fn test_sidecar_file_from_command() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("Dexter - S03E07 - Easy as Pie.txt");
    let source = shell("echo 'Commercial Skip List: 0-1200'");

    let list = source.skip_list(&recording(1051, "Dexter", 3, 7)).await.unwrap();
    write_sidecar(&path, &list).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "FILE PROCESSING COMPLETE\n------------------------\n0 1200\n"
    );
}
