use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|err| panic!("clock should be >= UNIX_EPOCH: {err}"))
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{prefix}-{now}"));
    fs::create_dir_all(&dir)
        .unwrap_or_else(|err| panic!("failed to create temp dir {}: {err}", dir.display()));
    dir
}

fn run_rt<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Command::new(env!("CARGO_BIN_EXE_rt"))
        .args(args)
        .env_remove("REMOTE_TASKS_DB")
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|err| panic!("failed to execute rt binary: {err}"))
}

fn run_json<I, S>(args: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = run_rt(args);
    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "rt command failed (status={}):\nstdout:\n{}\nstderr:\n{}",
            output.status, stdout, stderr
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    serde_json::from_str(&stdout)
        .unwrap_or_else(|err| panic!("stdout is not valid JSON: {err}\nstdout:\n{stdout}"))
}

fn run_failure<I, S>(args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = run_rt(args);
    assert!(!output.status.success(), "rt command unexpectedly succeeded");
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn as_i64(value: &Value, key: &str) -> i64 {
    value
        .get(key)
        .and_then(Value::as_i64)
        .unwrap_or_else(|| panic!("missing integer field `{key}` in payload: {value}"))
}

fn as_str<'a>(value: &'a Value, key: &str) -> &'a str {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_else(|| panic!("missing string field `{key}` in payload: {value}"))
}

fn as_bool(value: &Value, key: &str) -> bool {
    value
        .get(key)
        .and_then(Value::as_bool)
        .unwrap_or_else(|| panic!("missing boolean field `{key}` in payload: {value}"))
}

fn as_array<'a>(value: &'a Value, key: &str) -> &'a Vec<Value> {
    value
        .get(key)
        .and_then(Value::as_array)
        .unwrap_or_else(|| panic!("missing array field `{key}` in payload: {value}"))
}

fn names_of(values: &[Value], key: &str) -> Vec<String> {
    values.iter().map(|value| as_str(value, key).to_string()).collect()
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap_or_else(|| panic!("path should be valid UTF-8: {}", path.display()))
}

#[test]
fn db_migrate_schema_version_and_integrity_check() {
    let dir = unique_temp_dir("rt-db");
    let db = dir.join("rt.sqlite3");

    let dry_run = run_json(["--db", path_str(&db), "db", "migrate", "--dry-run"]);
    assert!(as_bool(&dry_run, "dry_run"));
    assert_eq!(as_array(&dry_run, "would_apply_versions").len(), 1);
    assert_eq!(as_str(&dry_run, "contract_version"), "cli.v1");

    let before = run_json(["--db", path_str(&db), "db", "schema-version"]);
    assert_eq!(as_i64(&before, "current_version"), 0);
    assert!(!as_bool(&before, "up_to_date"));

    let migrate = run_json(["--db", path_str(&db), "db", "migrate"]);
    assert_eq!(as_i64(&migrate, "after_version"), 1);
    assert!(as_bool(&migrate, "up_to_date"));

    let again = run_json(["--db", path_str(&db), "db", "migrate"]);
    assert!(as_array(&again, "applied_versions").is_empty());

    let integrity = run_json(["--db", path_str(&db), "db", "integrity-check"]);
    assert!(as_bool(&integrity, "quick_check_ok"));
    assert_eq!(as_i64(&integrity, "settings_keys"), 0);

    let backup_file = dir.join("backups/rt-backup.sqlite3");
    let backup = run_json(["--db", path_str(&db), "db", "backup", "--out", path_str(&backup_file)]);
    assert_eq!(as_str(&backup, "status"), "ok");
    assert!(backup_file.exists());
}

#[test]
fn videos_list_filters_case_insensitively_by_field() {
    let all = run_json(["videos", "list"]);
    assert_eq!(as_i64(&all, "count"), 5);

    let by_title = run_json(["videos", "list", "--query", "BIOLOGY"]);
    assert_eq!(names_of(as_array(&by_title, "videos"), "title"), vec!["The Wonders of Biology"]);

    let by_description =
        run_json(["videos", "list", "--query", "programming", "--field", "description"]);
    assert_eq!(as_str(&by_description, "field"), "description");
    assert_eq!(
        names_of(as_array(&by_description, "videos"), "title"),
        vec!["Coding Fundamentals"]
    );

    let none = run_json(["videos", "list", "--query", "astronomy"]);
    assert_eq!(as_i64(&none, "count"), 0);
}

#[test]
fn videos_play_reports_catalogue_rating_and_taps() {
    let played = run_json(["videos", "play", "--title", "Historical Journeys"]);
    let rating = played.get("rating").unwrap_or_else(|| panic!("missing rating: {played}"));
    assert_eq!(as_i64(rating, "filled_stars"), 5);
    assert!(played.get("tap_accepted").is_some_and(Value::is_null));

    let tapped = run_json(["videos", "play", "--title", "Historical Journeys", "--tap", "2"]);
    let rating = tapped.get("rating").unwrap_or_else(|| panic!("missing rating: {tapped}"));
    assert_eq!(as_i64(rating, "filled_stars"), 2);
    assert_eq!(as_i64(rating, "user_rating"), 2);
    assert!(as_bool(&tapped, "tap_accepted"));

    let ignored = run_json(["videos", "play", "--title", "Historical Journeys", "--tap", "9"]);
    assert!(!as_bool(&ignored, "tap_accepted"));

    let stderr = run_failure(["videos", "play", "--title", "Unknown Video"]);
    assert!(stderr.contains("unknown video title"));
}

#[test]
fn tutorials_list_searches_titles() {
    let all = run_json(["tutorials", "list"]);
    assert!(as_i64(&all, "count") > 0);

    let swift = run_json(["tutorials", "list", "--query", "swiftui"]);
    assert_eq!(names_of(as_array(&swift, "tutorials"), "title"), vec!["SwiftUI Masterclass"]);
}

#[test]
fn groups_create_appends_and_blank_fields_are_rejected() {
    let listed = run_json(["groups", "list"]);
    assert_eq!(
        names_of(as_array(&listed, "groups"), "name"),
        vec!["Calculus 101", "Intro to Biology", "Web Development"]
    );

    let created = run_json([
        "groups",
        "create",
        "--name",
        "Physics Club",
        "--description",
        "Weekly problem sets",
    ]);
    let groups = names_of(as_array(&created, "groups"), "name");
    assert_eq!(groups.len(), 4);
    assert_eq!(groups.last().map(String::as_str), Some("Physics Club"));

    let stderr = run_failure(["groups", "create", "--name", "   ", "--description", "x"]);
    assert!(stderr.contains("name MUST be non-empty"));
}

#[test]
fn groups_upload_attaches_file_to_group() {
    let dir = unique_temp_dir("rt-upload");
    let file = dir.join("syllabus.pdf");
    fs::write(&file, b"%PDF-1.4 syllabus")
        .unwrap_or_else(|err| panic!("failed to write fixture {}: {err}", file.display()));

    let uploaded =
        run_json(["groups", "upload", "--group", "Calculus 101", "--file", path_str(&file)]);
    let shared = uploaded.get("file").unwrap_or_else(|| panic!("missing file: {uploaded}"));
    assert_eq!(as_str(shared, "file_name"), "syllabus.pdf");
    assert_eq!(as_i64(shared, "size_bytes"), 17);
    assert_eq!(as_i64(&uploaded, "shared_files"), 1);

    let stderr =
        run_failure(["groups", "upload", "--group", "Chemistry", "--file", path_str(&file)]);
    assert!(stderr.contains("unknown study group"));
}

#[test]
fn chat_send_appends_local_message() {
    let sent = run_json(["chat", "send", "--group", "Web Development", "--text", "Hello all"]);
    assert_eq!(as_str(&sent, "session"), "Live Session: Web Development");

    let message = sent.get("message").unwrap_or_else(|| panic!("missing message: {sent}"));
    assert_eq!(as_str(message, "sender"), "Your User");
    assert_eq!(as_str(message, "text"), "Hello all");
    assert_eq!(as_array(&sent, "messages").len(), 3);

    let stderr = run_failure(["chat", "send", "--group", "Web Development", "--text", ""]);
    assert!(stderr.contains("text MUST be non-empty"));
}

#[test]
fn vault_create_stamps_date_header_and_rejects_past_dates() {
    let dir = unique_temp_dir("rt-vault");
    let photo = dir.join("sunset.jpg");
    fs::write(&photo, [0xFF, 0xD8, 0xFF])
        .unwrap_or_else(|err| panic!("failed to write fixture {}: {err}", photo.display()));

    let created = run_json([
        "vault",
        "create",
        "--comment",
        "Open me later",
        "--open-date",
        "2999-01-05",
        "--photo",
        path_str(&photo),
    ]);
    let entry = created.get("entry").unwrap_or_else(|| panic!("missing entry: {created}"));
    assert_eq!(as_str(entry, "title"), "Jan 05, 2999");
    assert_eq!(as_str(entry, "comment"), "Jan 05, 2999\nOpen me later");
    assert_eq!(as_i64(entry, "photos"), 1);
    assert!(as_bool(entry, "locked"));

    let undated = run_json(["vault", "create", "--comment", "Right now"]);
    let entry = undated.get("entry").unwrap_or_else(|| panic!("missing entry: {undated}"));
    assert_eq!(as_str(entry, "title"), "Right now");
    assert!(!as_bool(entry, "locked"));

    let stderr =
        run_failure(["vault", "create", "--comment", "Too late", "--open-date", "2000-01-01"]);
    assert!(stderr.contains("open_date MUST NOT be earlier than"));

    let stderr = run_failure(["vault", "create", "--comment", "x", "--open-date", "tomorrow"]);
    assert!(stderr.contains("invalid open date"));
}

#[test]
fn vault_create_requires_text_below_the_date_header() {
    let stderr = run_failure(["vault", "create", "--comment", "", "--open-date", "2999-01-05"]);
    assert!(stderr.contains("comment MUST be non-empty"), "unexpected stderr: {stderr}");

    let stderr = run_failure(["vault", "create", "--comment", "  ", "--open-date", "2999-01-05"]);
    assert!(stderr.contains("comment MUST be non-empty"), "unexpected stderr: {stderr}");
}

#[test]
fn weather_search_and_show() {
    let dir = unique_temp_dir("rt-weather");
    let db = dir.join("rt.sqlite3");

    let found = run_json(["--db", path_str(&db), "weather", "search", "--query", "san"]);
    assert_eq!(
        names_of(as_array(&found, "locations"), "name"),
        vec!["San Francisco", "San Mateo"]
    );

    let hourly = run_json(["--db", path_str(&db), "weather", "show", "--name", "San Francisco"]);
    assert_eq!(as_str(&hourly, "title"), "San Francisco");
    assert_eq!(as_str(&hourly, "summary"), "65°C, Partly Cloudy");
    assert_eq!(as_str(&hourly, "range"), "H: 70°C L: 58°C");
    assert!(!as_bool(&hourly, "is_favorite"));
    let forecast = hourly.get("forecast").unwrap_or_else(|| panic!("missing forecast: {hourly}"));
    assert_eq!(as_str(forecast, "mode"), "hourly");
    assert_eq!(as_array(forecast, "entries").len(), 8);

    let daily =
        run_json(["--db", path_str(&db), "weather", "show", "--name", "London", "--daily"]);
    let forecast = daily.get("forecast").unwrap_or_else(|| panic!("missing forecast: {daily}"));
    assert_eq!(as_str(forecast, "mode"), "daily");
    assert_eq!(as_array(forecast, "entries").len(), 5);

    let stderr = run_failure(["--db", path_str(&db), "weather", "show", "--name", "Atlantis"]);
    assert!(stderr.contains("unknown location"));
}

#[test]
fn weather_favorites_toggle_and_persist_across_invocations() {
    let dir = unique_temp_dir("rt-favorites");
    let db = dir.join("rt.sqlite3");

    let empty = run_json(["--db", path_str(&db), "weather", "favorites"]);
    assert!(as_array(&empty, "names").is_empty());

    let on = run_json(["--db", path_str(&db), "weather", "favorite", "--name", "London"]);
    assert!(as_bool(&on, "is_favorite"));
    let second = run_json(["--db", path_str(&db), "weather", "favorite", "--name", "Vallejo"]);
    assert!(as_bool(&second, "is_favorite"));

    let shown = run_json(["--db", path_str(&db), "weather", "show", "--name", "London"]);
    assert!(as_bool(&shown, "is_favorite"));

    let listed = run_json(["--db", path_str(&db), "weather", "favorites"]);
    assert_eq!(names_of(as_array(&listed, "locations"), "name"), vec!["London", "Vallejo"]);

    let off = run_json(["--db", path_str(&db), "weather", "favorite", "--name", "London"]);
    assert!(!as_bool(&off, "is_favorite"));

    let listed = run_json(["--db", path_str(&db), "weather", "favorites"]);
    let names = as_array(&listed, "names")
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Vallejo".to_string()]);

    let integrity = run_json(["--db", path_str(&db), "db", "integrity-check"]);
    assert_eq!(as_i64(&integrity, "settings_keys"), 1);
}
