use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use bh_core::ModelId;
use bh_session::{FileStore, KeyValueStore, MODEL_ID_KEY, Session};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

#[test]
fn model_id_survives_a_new_session() {
    let state_dir = unique_temp_dir("bh_session_reload");

    let first = Session::persistent(&state_dir);
    assert_eq!(first.model_id(), None);
    first.set_model_id(&ModelId::parse("65f0c1d2e3").unwrap());

    // A second handle on the same directory stands in for a reload.
    let reloaded = Session::persistent(&state_dir);
    assert_eq!(reloaded.model_id().unwrap().as_str(), "65f0c1d2e3");

    let on_disk = fs::read_to_string(state_dir.join(MODEL_ID_KEY)).expect("plain-text value");
    assert_eq!(on_disk, "65f0c1d2e3");

    reloaded.clear_model_id();
    assert_eq!(Session::persistent(&state_dir).model_id(), None);

    let _ = fs::remove_dir_all(&state_dir);
}

#[test]
fn unavailable_storage_degrades_to_no_ops() {
    // A regular file where the state directory should be makes every write fail.
    let blocker = unique_temp_dir("bh_session_blocked");
    fs::write(&blocker, "not a directory").expect("failed to create blocker file");

    let store = FileStore::new(blocker.join("state"));
    assert!(store.set(MODEL_ID_KEY, "abc").is_err());

    let session = Session::persistent(blocker.join("state"));
    session.set_model_id(&ModelId::parse("abc").unwrap());
    assert_eq!(session.model_id(), None);
    session.clear_model_id();

    let _ = fs::remove_file(&blocker);
}

#[test]
fn file_store_overwrites_and_removes() {
    let state_dir = unique_temp_dir("bh_session_store");
    let store = FileStore::new(&state_dir);

    store.set("modelId", "one").unwrap();
    store.set("modelId", "two").unwrap();
    assert_eq!(store.get("modelId").unwrap().as_deref(), Some("two"));

    store.remove("modelId").unwrap();
    store.remove("modelId").unwrap();
    assert_eq!(store.get("modelId").unwrap(), None);

    let _ = fs::remove_dir_all(&state_dir);
}
