use std::sync::Arc;

use chrono::{DateTime, Utc};

use civicstats_core::analytics::{Dimension, IdeaRecord, IdeaStore, PlatformSettings};
use civicstats_core::filter::FilterSpec;
use civicstats_duckdb::{DuckDbBackend, NewIdea};

fn utc(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

fn idea(id: &str, project_id: &str, published_at: Option<&str>, topics: &[&str]) -> NewIdea {
    NewIdea {
        id: id.to_string(),
        project_id: project_id.to_string(),
        author_id: Some(format!("user_{id}")),
        status_id: "st_proposed".to_string(),
        published_at: published_at.map(utc),
        topic_ids: topics.iter().map(|t| (*t).to_string()).collect(),
    }
}

async fn seeded() -> Arc<DuckDbBackend> {
    let db = Arc::new(DuckDbBackend::open_in_memory().expect("db"));
    db.insert_project("prj_park", "Park", "ideation")
        .await
        .expect("project");
    db.insert_project("prj_survey", "Survey", "native_survey")
        .await
        .expect("project");
    db.insert_status("st_proposed", "proposed", "Proposed")
        .await
        .expect("status");
    db.insert_topic("tpc_mobility", "Mobility").await.expect("topic");
    db.insert_topic("tpc_nature", "Nature").await.expect("topic");

    db.insert_idea(&idea(
        "idea_1",
        "prj_park",
        Some("2024-03-01T10:00:00Z"),
        &["tpc_nature", "tpc_mobility"],
    ))
    .await
    .expect("idea");
    db.insert_idea(&idea("idea_2", "prj_park", Some("2024-04-01T10:00:00.250Z"), &[]))
        .await
        .expect("idea");
    db.insert_idea(&idea("idea_draft", "prj_park", None, &["tpc_nature"]))
        .await
        .expect("idea");
    db.insert_idea(&idea(
        "idea_survey",
        "prj_survey",
        Some("2024-03-15T10:00:00Z"),
        &[],
    ))
    .await
    .expect("idea");
    db
}

async fn scan(store: &dyn IdeaStore, filter: &FilterSpec) -> Vec<IdeaRecord> {
    let mut seen = Vec::new();
    let mut sink = |idea: &IdeaRecord| seen.push(idea.clone());
    store.scan_ideas(filter, &mut sink).await.expect("scan");
    seen
}

#[tokio::test]
async fn scan_skips_drafts_and_survey_responses() {
    let db = seeded().await;
    let records = scan(db.as_ref(), &FilterSpec::default()).await;
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["idea_1", "idea_2"]);
}

#[tokio::test]
async fn scan_returns_topics_in_their_stored_order() {
    let db = seeded().await;
    let records = scan(db.as_ref(), &FilterSpec::default()).await;
    assert_eq!(records[0].topic_ids, vec!["tpc_nature", "tpc_mobility"]);
    assert!(records[1].topic_ids.is_empty());
    assert_eq!(records[1].published_at, Some(utc("2024-04-01T10:00:00.250Z")));
    assert_eq!(records[0].author_id.as_deref(), Some("user_idea_1"));
}

#[tokio::test]
async fn scan_pushes_down_bounds_inclusively() {
    let db = seeded().await;
    let filter = FilterSpec {
        start_at: Some(utc("2024-03-01T10:00:00Z")),
        end_at: Some(utc("2024-03-01T10:00:00Z")),
        ..Default::default()
    };
    let records = scan(db.as_ref(), &filter).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "idea_1");
}

#[tokio::test]
async fn scan_pushes_down_topic_and_group() {
    let db = seeded().await;
    db.insert_membership("grp_1", "user_idea_2")
        .await
        .expect("membership");

    let by_topic = FilterSpec {
        topic_id: Some("tpc_mobility".to_string()),
        ..Default::default()
    };
    let records = scan(db.as_ref(), &by_topic).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].topic_ids.len(), 2, "topic filter keeps the full topic list");

    let by_group = FilterSpec {
        group_id: Some("grp_1".to_string()),
        ..Default::default()
    };
    let records = scan(db.as_ref(), &by_group).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "idea_2");

    let members = db.group_member_ids("grp_1").await.expect("members");
    assert!(members.contains("user_idea_2"));
    assert!(db.group_member_ids("grp_none").await.expect("members").is_empty());
}

#[tokio::test]
async fn feedback_flag_reflects_official_feedback_rows() {
    let db = seeded().await;
    db.insert_official_feedback("fb_1", "idea_2", utc("2024-05-01T08:00:00Z"))
        .await
        .expect("feedback");
    let records = scan(db.as_ref(), &FilterSpec::default()).await;
    assert!(!records[0].has_official_feedback);
    assert!(records[1].has_official_feedback);
}

#[tokio::test]
async fn reinserting_an_idea_replaces_its_topics() {
    let db = seeded().await;
    db.insert_idea(&idea(
        "idea_1",
        "prj_park",
        Some("2024-03-01T10:00:00Z"),
        &["tpc_mobility"],
    ))
    .await
    .expect("idea");
    let records = scan(db.as_ref(), &FilterSpec::default()).await;
    assert_eq!(records[0].topic_ids, vec!["tpc_mobility"]);
}

#[tokio::test]
async fn titles_resolve_known_ids_only() {
    let db = seeded().await;
    let titles = db
        .titles(
            Dimension::Topic,
            &["tpc_nature".to_string(), "tpc_unknown".to_string()],
        )
        .await
        .expect("titles");
    assert_eq!(titles.get("tpc_nature").map(String::as_str), Some("Nature"));
    assert!(!titles.contains_key("tpc_unknown"));

    let statuses = db
        .titles(Dimension::Status, &["st_proposed".to_string()])
        .await
        .expect("titles");
    assert_eq!(statuses.get("st_proposed").map(String::as_str), Some("Proposed"));

    assert!(db
        .titles(Dimension::None, &["anything".to_string()])
        .await
        .expect("titles")
        .is_empty());
}

#[tokio::test]
async fn catalogs_load_survey_flag_and_status_codes() {
    let db = seeded().await;
    let projects = db.projects().await.expect("projects");
    assert_eq!(projects.len(), 2);
    assert!(projects
        .iter()
        .any(|p| p.id == "prj_survey" && p.is_native_survey()));
    let statuses = db.idea_statuses().await.expect("statuses");
    assert_eq!(statuses[0].code, "proposed");
}

#[tokio::test]
async fn platform_settings_round_trip_through_the_settings_table() {
    let db = DuckDbBackend::open_in_memory().expect("db");
    let initial = db.platform_settings().await.expect("settings");
    assert_eq!(initial.timezone, chrono_tz::UTC);

    let platform = PlatformSettings {
        timezone: chrono_tz::Europe::Brussels,
        created_at: utc("2019-05-01T00:00:00Z"),
    };
    db.set_platform_settings(&platform).await.expect("set");
    let loaded = db.platform_settings().await.expect("settings");
    assert_eq!(loaded.timezone, chrono_tz::Europe::Brussels);
    assert_eq!(loaded.created_at, platform.created_at);
}

#[tokio::test]
async fn reopening_a_file_keeps_seeded_settings() {
    let dir = std::env::temp_dir().join(format!(
        "civicstats-settings-{}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).expect("tmp dir");
    let path = dir.join("civicstats.db");
    let path = path.to_str().expect("utf-8 path");
    let _ = std::fs::remove_file(path);

    let first = PlatformSettings {
        timezone: chrono_tz::America::Sao_Paulo,
        created_at: utc("2018-01-01T00:00:00Z"),
    };
    {
        let db = DuckDbBackend::open(path, "256MB", &first).expect("open");
        db.platform_settings().await.expect("settings");
    }
    let second = PlatformSettings {
        timezone: chrono_tz::UTC,
        created_at: utc("2024-01-01T00:00:00Z"),
    };
    let db = DuckDbBackend::open(path, "256MB", &second).expect("reopen");
    let loaded = db.platform_settings().await.expect("settings");
    assert_eq!(loaded.timezone, chrono_tz::America::Sao_Paulo);
    assert_eq!(loaded.created_at, first.created_at);

    drop(db);
    let _ = std::fs::remove_dir_all(&dir);
}
