//! Integration tests for the directory-backed descriptor store.

use std::path::Path;

use assert_matches::assert_matches;
use manim_core::job::{JobDescriptor, JobStatus, RenderQuality};
use manim_store::fs::DEFAULT_PREFIX;
use manim_store::{DescriptorStore, FsDescriptorStore, StoreError};
use serde_json::{json, Value};

fn write_json(dir: &Path, name: &str, value: &Value) {
    std::fs::write(dir.join(name), serde_json::to_vec_pretty(value).unwrap()).unwrap();
}

fn store_in(dir: &Path) -> FsDescriptorStore {
    FsDescriptorStore::new(dir, DEFAULT_PREFIX)
}

// ---------------------------------------------------------------------------
// Enumeration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_queued_filters_by_status() {
    let tmp = tempfile::tempdir().unwrap();
    write_json(tmp.path(), "manim-1.json", &json!({"jobId": "manim-1", "status": "queued"}));
    write_json(tmp.path(), "manim-2.json", &json!({"jobId": "manim-2", "status": "completed", "resultUrl": "/v.mp4"}));
    write_json(tmp.path(), "manim-3.json", &json!({"jobId": "manim-3", "status": "queued"}));

    let store = store_in(tmp.path());
    let mut ids: Vec<String> = store
        .list_queued()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.job.job_id)
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["manim-1", "manim-3"]);
}

#[tokio::test]
async fn malformed_and_unrelated_files_are_skipped() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("manim-bad.json"), b"{ not json").unwrap();
    write_json(tmp.path(), "manim-nostatus.json", &json!({"jobId": "manim-nostatus"}));
    write_json(tmp.path(), "other-1.json", &json!({"jobId": "other-1", "status": "queued"}));
    write_json(tmp.path(), "manim-4.txt", &json!({"jobId": "manim-4", "status": "queued"}));
    std::fs::create_dir(tmp.path().join("manim-dir.json")).unwrap();
    write_json(tmp.path(), "manim-5.json", &json!({"jobId": "manim-5", "status": "queued"}));

    let store = store_in(tmp.path());
    let queued = store.list_queued().await.unwrap();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].job.job_id, "manim-5");
    assert_eq!(queued[0].location, tmp.path().join("manim-5.json"));
}

#[tokio::test]
async fn list_by_status_finds_processing() {
    let tmp = tempfile::tempdir().unwrap();
    write_json(tmp.path(), "manim-1.json", &json!({"jobId": "manim-1", "status": "processing"}));
    write_json(tmp.path(), "manim-2.json", &json!({"jobId": "manim-2", "status": "queued"}));

    let store = store_in(tmp.path());
    let processing = store.list_by_status(JobStatus::Processing).await.unwrap();
    assert_eq!(processing.len(), 1);
    assert_eq!(processing[0].job.job_id, "manim-1");
}

#[tokio::test]
async fn pick_one_returns_none_when_nothing_queued() {
    let tmp = tempfile::tempdir().unwrap();
    write_json(tmp.path(), "manim-1.json", &json!({"jobId": "manim-1", "status": "failed", "error": "boom"}));

    let store = store_in(tmp.path());
    assert!(store.pick_one().await.unwrap().is_none());
}

#[tokio::test]
async fn pick_one_returns_a_queued_job() {
    let tmp = tempfile::tempdir().unwrap();
    write_json(tmp.path(), "manim-1.json", &json!({"jobId": "manim-1", "status": "completed", "resultUrl": "/a.mp4"}));
    write_json(tmp.path(), "manim-2.json", &json!({"jobId": "manim-2", "status": "queued"}));

    let store = store_in(tmp.path());
    let picked = store.pick_one().await.unwrap().unwrap();
    assert_eq!(picked.job.job_id, "manim-2");
    assert_eq!(picked.job.status, JobStatus::Queued);
}

#[tokio::test]
async fn mistyped_prompt_and_quality_do_not_hide_a_job() {
    let tmp = tempfile::tempdir().unwrap();
    write_json(
        tmp.path(),
        "manim-9.json",
        &json!({"jobId": "manim-9", "status": "queued", "prompt": 42, "quality": 720}),
    );

    let store = store_in(tmp.path());
    let picked = store.pick_one().await.unwrap().unwrap();
    assert_eq!(picked.job.job_id, "manim-9");
    assert_eq!(picked.job.prompt_text(), None);
    assert_eq!(picked.job.render_quality(), RenderQuality::Low);
    assert_eq!(store.list_queued().await.unwrap().len(), 1);
}

#[tokio::test]
async fn missing_directory_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store_in(&tmp.path().join("does-not-exist"));
    assert_matches!(store.list_queued().await, Err(StoreError::Io { .. }));
}

#[tokio::test]
async fn ensure_dir_creates_missing_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store_in(&tmp.path().join("nested").join("jobs"));
    store.ensure_dir().await.unwrap();
    assert!(store.dir().is_dir());
    assert!(store.list_queued().await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Get by id
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_existing_missing_and_malformed() {
    let tmp = tempfile::tempdir().unwrap();
    write_json(tmp.path(), "manim-1.json", &json!({"jobId": "manim-1", "status": "queued"}));
    std::fs::write(tmp.path().join("manim-2.json"), b"[]").unwrap();

    let store = store_in(tmp.path());

    let found = store.get("manim-1").await.unwrap().unwrap();
    assert_eq!(found.job.job_id, "manim-1");

    let bare = store.get("1").await.unwrap().unwrap();
    assert_eq!(bare.location, found.location);

    assert!(store.get("manim-404").await.unwrap().is_none());
    assert_matches!(store.get("manim-2").await, Err(StoreError::Malformed { .. }));
    assert_matches!(store.get("../manim-1").await, Err(StoreError::Core(_)));
}

// ---------------------------------------------------------------------------
// Write
// ---------------------------------------------------------------------------

#[tokio::test]
async fn write_replaces_document_and_keeps_extra_keys() {
    let tmp = tempfile::tempdir().unwrap();
    write_json(
        tmp.path(),
        "manim-7.json",
        &json!({
            "jobId": "manim-7",
            "status": "queued",
            "prompt": "Binary search",
            "createdAt": "2026-01-01T00:00:00.000Z"
        }),
    );

    let store = store_in(tmp.path());
    let mut stored = store.pick_one().await.unwrap().unwrap();
    stored.job.claim().unwrap();
    store.write(&stored.location, &stored.job).await.unwrap();

    let raw = std::fs::read_to_string(&stored.location).unwrap();
    assert!(raw.contains("\n  \"status\": \"processing\""));
    assert!(raw.ends_with('\n'));

    let on_disk: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(on_disk["status"], "processing");
    assert_eq!(on_disk["prompt"], "Binary search");
    assert_eq!(on_disk["createdAt"], "2026-01-01T00:00:00.000Z");

    // Claimed descriptors are no longer offered.
    assert!(store.pick_one().await.unwrap().is_none());
}

#[tokio::test]
async fn write_leaves_no_temp_files_behind() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store_in(tmp.path());
    let location = store.path_for("manim-8").unwrap();

    store
        .write(&location, &JobDescriptor::queued("manim-8"))
        .await
        .unwrap();

    let names: Vec<String> = std::fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["manim-8.json"]);

    let read_back = store.get("manim-8").await.unwrap().unwrap();
    assert_eq!(read_back.job, JobDescriptor::queued("manim-8"));
}

#[tokio::test]
async fn write_rejects_descriptor_inconsistent_with_its_status() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store_in(tmp.path());
    let location = store.path_for("manim-10").unwrap();

    let mut job = JobDescriptor::queued("manim-10");
    job.error = Some("stale failure".into());

    assert_matches!(store.write(&location, &job).await, Err(StoreError::Core(_)));
    assert!(!location.exists());
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
}
