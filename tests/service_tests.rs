//! Service-level functional tests.
//!
//! Drives each service through `Service::handle`, checking the JSON-RPC
//! results and error codes a client sees.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Value};
use wcp_services::{
    BuildService, ConfigService, FsService, Service, Settings, SharedRegistry, TabService,
    WorkspaceService,
};
use wcp_vfs::{EventBus, MemoryStore, RegistryConfig, Store, WorkspaceRegistry};

struct Fixture {
    registry: SharedRegistry,
    store: MemoryStore,
    settings: Settings,
    fs: FsService,
    workspace: WorkspaceService,
    tab: TabService,
    build: BuildService,
    config: ConfigService,
}

fn fixture() -> Fixture {
    let store = MemoryStore::new();
    let shared: Arc<dyn Store> = Arc::new(store.clone());
    let registry = WorkspaceRegistry::init(shared, EventBus::new(), RegistryConfig::default()).unwrap();
    let registry: SharedRegistry = Arc::new(Mutex::new(registry));
    let settings = Settings::default();
    Fixture {
        fs: FsService::new(registry.clone()),
        workspace: WorkspaceService::new(registry.clone(), settings.clone()),
        tab: TabService::new(registry.clone()),
        build: BuildService::new(registry.clone()),
        config: ConfigService::new(settings.clone(), registry.clone(), None),
        registry,
        store,
        settings,
    }
}

/// Fixture with an active workspace `alpha` of the given framework.
async fn with_alpha(framework: &str) -> Fixture {
    let f = fixture();
    f.workspace
        .handle("workspace/create", Some(json!({ "name": "alpha", "framework": framework })))
        .await
        .unwrap();
    f
}

fn code(err: wcp_protocol::WCPError) -> i32 {
    err.code
}

// ─────────────────────────────────────────────────────────────────────────────
// fs/*
// ─────────────────────────────────────────────────────────────────────────────

mod fs {
    use super::*;

    #[tokio::test]
    async fn create_then_read() {
        let f = with_alpha("native").await;
        let created = f.fs.handle("fs/create", Some(json!({
            "path": "/src/util.rs",
            "content": "pub fn one() -> u8 { 1 }",
        }))).await.unwrap();
        assert_eq!(created["path"], "/src/util.rs");
        assert!(created.get("warnings").is_none());

        let read = f.fs.handle("fs/read", Some(json!({ "path": "/src/util.rs" }))).await.unwrap();
        assert_eq!(read["content"], "pub fn one() -> u8 { 1 }");
    }

    #[tokio::test]
    async fn missing_params_is_invalid_params() {
        let f = with_alpha("native").await;
        let err = f.fs.handle("fs/create", None).await.unwrap_err();
        assert_eq!(code(err), -32602);
        let err = f.fs.handle("fs/read", Some(json!({ "file": "/x" }))).await.unwrap_err();
        assert_eq!(code(err), -32602);
    }

    #[tokio::test]
    async fn escaping_path_is_invalid_path() {
        let f = with_alpha("native").await;
        let err = f.fs.handle("fs/create", Some(json!({ "path": "/../etc" }))).await.unwrap_err();
        assert_eq!(code(err.clone()), -32100);
        assert_eq!(err.data, Some(json!({ "kind": "InvalidPath" })));
    }

    #[tokio::test]
    async fn no_active_workspace() {
        let f = fixture();
        let err = f.fs.handle("fs/list", None).await.unwrap_err();
        assert_eq!(code(err), -32108);
    }

    #[tokio::test]
    async fn create_twice_is_already_exists() {
        let f = with_alpha("native").await;
        let err = f.fs.handle("fs/create", Some(json!({ "path": "/src/lib.rs" }))).await.unwrap_err();
        assert_eq!(code(err), -32102);
    }

    #[tokio::test]
    async fn list_defaults_to_root() {
        let f = with_alpha("native").await;
        let root = f.fs.handle("fs/list", None).await.unwrap();
        let paths: Vec<&str> = root["items"].as_array().unwrap()
            .iter()
            .map(|i| i["path"].as_str().unwrap())
            .collect();
        assert_eq!(paths, vec!["/src/"]);

        let src = f.fs.handle("fs/list", Some(json!({ "path": "/src/" }))).await.unwrap();
        assert_eq!(src["items"][0]["path"], "/src/lib.rs");
        assert_eq!(src["items"][0]["type"], "file");
    }

    #[tokio::test]
    async fn exists_and_item_type() {
        let f = with_alpha("native").await;
        let r = f.fs.handle("fs/exists", Some(json!({ "path": "/src/lib.rs" }))).await.unwrap();
        assert_eq!(r["exists"], true);
        let r = f.fs.handle("fs/itemType", Some(json!({ "path": "/src/" }))).await.unwrap();
        assert_eq!(r["type"], "directory");
        let r = f.fs.handle("fs/itemType", Some(json!({ "path": "/nope" }))).await.unwrap();
        assert!(r["type"].is_null());
    }

    #[tokio::test]
    async fn rename_and_move() {
        let f = with_alpha("native").await;
        f.fs.handle("fs/create", Some(json!({ "path": "/docs/" }))).await.unwrap();
        let r = f.fs.handle("fs/rename", Some(json!({ "from": "/src/lib.rs", "to": "/src/main.rs" })))
            .await.unwrap();
        assert_eq!(r["path"], "/src/main.rs");

        let r = f.fs.handle("fs/move", Some(json!({ "path": "/src/main.rs", "destination": "/docs/" })))
            .await.unwrap();
        assert_eq!(r["path"], "/docs/main.rs");

        let r = f.fs.handle("fs/exists", Some(json!({ "path": "/src/lib.rs" }))).await.unwrap();
        assert_eq!(r["exists"], false);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let f = with_alpha("native").await;
        let args = json!({ "path": "/src/lib.rs" });
        f.fs.handle("fs/delete", Some(args.clone())).await.unwrap();
        let again = f.fs.handle("fs/delete", Some(args)).await.unwrap();
        assert_eq!(again["success"], true);
    }

    #[tokio::test]
    async fn edit_is_pending_until_flush() {
        let f = with_alpha("native").await;
        let key = "items/alpha/src/lib.rs";
        let before = f.store.get_string(key);

        let r = f.fs.handle("fs/edit", Some(json!({ "path": "/src/lib.rs", "content": "// edited" })))
            .await.unwrap();
        assert_eq!(r["pending"], 1);

        // Reads see the edit before the store does.
        let read = f.fs.handle("fs/read", Some(json!({ "path": "/src/lib.rs" }))).await.unwrap();
        assert_eq!(read["content"], "// edited");
        assert_eq!(f.store.get_string(key), before);

        let r = f.fs.handle("fs/flush", None).await.unwrap();
        assert_eq!(r["flushed"], 1);
        assert_eq!(f.store.get_string(key).as_deref(), Some("// edited"));
    }

    #[tokio::test]
    async fn save_writes_immediately() {
        let f = with_alpha("native").await;
        f.fs.handle("fs/save", Some(json!({ "path": "/src/lib.rs", "content": "saved" })))
            .await.unwrap();
        assert_eq!(f.store.get_string("items/alpha/src/lib.rs").as_deref(), Some("saved"));
    }

    #[tokio::test]
    async fn shutdown_flushes_pending_edits() {
        let f = with_alpha("native").await;
        f.fs.handle("fs/edit", Some(json!({ "path": "/src/lib.rs", "content": "late" })))
            .await.unwrap();
        f.fs.shutdown().await;
        assert_eq!(f.store.get_string("items/alpha/src/lib.rs").as_deref(), Some("late"));
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_warning() {
        let f = with_alpha("native").await;
        f.store.fail_writes(true);
        let r = f.fs.handle("fs/create", Some(json!({ "path": "/src/extra.rs" }))).await.unwrap();
        assert_eq!(r["path"], "/src/extra.rs");
        let warnings = r["warnings"].as_array().unwrap();
        assert!(!warnings.is_empty());
        assert!(warnings[0]["key"].is_string());

        // The tree still changed.
        let r = f.fs.handle("fs/exists", Some(json!({ "path": "/src/extra.rs" }))).await.unwrap();
        assert_eq!(r["exists"], true);

        // Warnings are reported once.
        f.store.fail_writes(false);
        let r = f.fs.handle("fs/exists", Some(json!({ "path": "/src/extra.rs" }))).await.unwrap();
        assert!(r.get("warnings").is_none());
    }

    #[tokio::test]
    async fn tree_lists_every_item() {
        let f = with_alpha("native").await;
        let r = f.fs.handle("fs/tree", None).await.unwrap();
        assert_eq!(r["workspace"], "alpha");
        let paths: Vec<&str> = r["items"].as_array().unwrap()
            .iter()
            .map(|i| i["path"].as_str().unwrap())
            .collect();
        assert!(paths.contains(&"/src/"));
        assert!(paths.contains(&"/src/lib.rs"));
    }

    #[tokio::test]
    async fn unknown_method() {
        let f = fixture();
        let err = f.fs.handle("fs/chmod", None).await.unwrap_err();
        assert_eq!(code(err), -32601);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// workspace/*
// ─────────────────────────────────────────────────────────────────────────────

mod workspace {
    use super::*;

    #[tokio::test]
    async fn first_create_becomes_current() {
        let f = fixture();
        let r = f.workspace.handle("workspace/create", Some(json!({ "name": "alpha" }))).await.unwrap();
        assert_eq!(r["current"], "alpha");

        let r = f.workspace.handle("workspace/create", Some(json!({ "name": "beta" }))).await.unwrap();
        assert_eq!(r["current"], "alpha");

        let list = f.workspace.handle("workspace/list", None).await.unwrap();
        assert_eq!(list["workspaces"], json!(["alpha", "beta"]));
        assert_eq!(list["scratch"], false);
    }

    #[tokio::test]
    async fn name_rules() {
        let f = fixture();
        for bad in ["", " padded", "a/b", "(scratch)", "this-name-is-definitely-longer-than-32"] {
            let err = f.workspace.handle("workspace/create", Some(json!({ "name": bad })))
                .await.unwrap_err();
            assert_eq!(code(err), -32101, "name {bad:?}");
        }
        f.workspace.handle("workspace/create", Some(json!({ "name": "alpha" }))).await.unwrap();
        let err = f.workspace.handle("workspace/create", Some(json!({ "name": "alpha" })))
            .await.unwrap_err();
        assert_eq!(code(err), -32104);
    }

    #[tokio::test]
    async fn unknown_framework_is_invalid_name() {
        let f = fixture();
        let err = f.workspace.handle("workspace/create", Some(json!({ "name": "a", "framework": "cobol" })))
            .await.unwrap_err();
        assert_eq!(code(err), -32101);
    }

    #[tokio::test]
    async fn switch_rename_delete() {
        let f = with_alpha("native").await;
        f.workspace.handle("workspace/create", Some(json!({ "name": "beta" }))).await.unwrap();

        let err = f.workspace.handle("workspace/delete", Some(json!({ "name": "alpha" })))
            .await.unwrap_err();
        assert_eq!(code(err), -32106);

        let r = f.workspace.handle("workspace/switch", Some(json!({ "name": "beta" }))).await.unwrap();
        assert_eq!(r["current"], "beta");

        let r = f.workspace.handle("workspace/rename", Some(json!({ "from": "beta", "to": "gamma" })))
            .await.unwrap();
        assert_eq!(r["current"], "gamma");

        f.workspace.handle("workspace/delete", Some(json!({ "name": "alpha" }))).await.unwrap();
        let list = f.workspace.handle("workspace/list", None).await.unwrap();
        assert_eq!(list["workspaces"], json!(["gamma"]));

        let err = f.workspace.handle("workspace/switch", Some(json!({ "name": "alpha" })))
            .await.unwrap_err();
        assert_eq!(code(err), -32103);
    }

    #[tokio::test]
    async fn switch_flushes_pending_edits() {
        let f = with_alpha("native").await;
        f.workspace.handle("workspace/create", Some(json!({ "name": "beta" }))).await.unwrap();
        f.fs.handle("fs/edit", Some(json!({ "path": "/src/lib.rs", "content": "typed" })))
            .await.unwrap();
        f.workspace.handle("workspace/switch", Some(json!({ "name": "beta" }))).await.unwrap();
        assert_eq!(f.store.get_string("items/alpha/src/lib.rs").as_deref(), Some("typed"));
        assert_eq!(f.registry.lock().pending_edits(), 0);
    }

    #[tokio::test]
    async fn current_describes_active_workspace() {
        let f = fixture();
        let r = f.workspace.handle("workspace/current", None).await.unwrap();
        assert!(r["workspace"].is_null());

        let f = with_alpha("anchor").await;
        let r = f.workspace.handle("workspace/current", None).await.unwrap();
        assert_eq!(r["workspace"]["name"], "alpha");
        assert_eq!(r["workspace"]["framework"], "anchor");
        assert_eq!(r["workspace"]["temporary"], false);
        assert_eq!(r["workspace"]["currentFile"], "/src/lib.rs");
    }

    #[tokio::test]
    async fn scratch_is_not_persisted() {
        let f = with_alpha("native").await;
        let r = f.workspace.handle("workspace/openScratch", Some(json!({
            "framework": "seahorse",
            "seed": [{ "path": "/main.py", "content": "print(1)" }],
        }))).await.unwrap();
        assert_eq!(r["current"], "(scratch)");

        f.fs.handle("fs/save", Some(json!({ "path": "/main.py", "content": "print(2)" })))
            .await.unwrap();
        assert!(f.store.keys().iter().all(|k| !k.contains("scratch")));

        let list = f.workspace.handle("workspace/list", None).await.unwrap();
        assert_eq!(list["scratch"], true);
        assert_eq!(list["workspaces"], json!(["alpha"]));
    }

    #[tokio::test]
    async fn default_framework_comes_from_settings() {
        let f = fixture();
        f.config.handle("config/set", Some(json!({
            "key": "workspace.defaultFramework",
            "value": "seahorse",
        }))).await.unwrap();
        f.workspace.handle("workspace/create", Some(json!({ "name": "py" }))).await.unwrap();
        let r = f.workspace.handle("workspace/current", None).await.unwrap();
        assert_eq!(r["workspace"]["framework"], "seahorse");
        let r = f.fs.handle("fs/exists", Some(json!({ "path": "/src/counter.py" }))).await.unwrap();
        assert_eq!(r["exists"], true);
    }

    #[tokio::test]
    async fn program_id_validation() {
        let f = with_alpha("anchor").await;
        let err = f.workspace.handle("workspace/setProgramId", Some(json!({ "programId": "not valid!" })))
            .await.unwrap_err();
        assert_eq!(code(err), -32101);

        let r = f.workspace.handle("workspace/setProgramId", Some(json!({ "programId": "Prog111" })))
            .await.unwrap();
        assert_eq!(r["programId"], "Prog111");

        let r = f.workspace.handle("workspace/setProgramId", Some(json!({ "programId": null })))
            .await.unwrap();
        assert!(r["programId"].is_null());
    }

    #[tokio::test]
    async fn frameworks_lists_all_templates() {
        let f = fixture();
        let r = f.workspace.handle("workspace/frameworks", None).await.unwrap();
        let names: Vec<&str> = r["frameworks"].as_array().unwrap()
            .iter()
            .map(|fw| fw["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["native", "anchor", "seahorse"]);
        assert_eq!(r["frameworks"][2]["language"], "python");
        assert_eq!(r["default"], "native");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// tab/*
// ─────────────────────────────────────────────────────────────────────────────

mod tab {
    use super::*;

    fn paths(v: &Value) -> Vec<String> {
        v.as_array().unwrap().iter().map(|p| p.as_str().unwrap().to_string()).collect()
    }

    #[tokio::test]
    async fn template_opens_default_file() {
        let f = with_alpha("native").await;
        let r = f.tab.handle("tab/list", None).await.unwrap();
        assert_eq!(paths(&r["tabs"]), vec!["/src/lib.rs"]);
        assert_eq!(r["current"], "/src/lib.rs");
    }

    #[tokio::test]
    async fn open_close_focus() {
        let f = with_alpha("native").await;
        f.fs.handle("fs/create", Some(json!({ "path": "/src/a.rs", "content": "a" }))).await.unwrap();
        f.fs.handle("fs/create", Some(json!({ "path": "/src/b.rs", "content": "b" }))).await.unwrap();

        let r = f.tab.handle("tab/open", Some(json!({ "path": "/src/a.rs" }))).await.unwrap();
        assert_eq!(r["content"], "a");
        f.tab.handle("tab/open", Some(json!({ "path": "/src/b.rs" }))).await.unwrap();

        let r = f.tab.handle("tab/current", None).await.unwrap();
        assert_eq!(r["path"], "/src/b.rs");

        f.tab.handle("tab/focus", Some(json!({ "path": "/src/lib.rs" }))).await.unwrap();
        let r = f.tab.handle("tab/close", Some(json!({ "path": "/src/lib.rs" }))).await.unwrap();
        assert_eq!(r["closed"], true);

        let r = f.tab.handle("tab/list", None).await.unwrap();
        assert_eq!(paths(&r["tabs"]), vec!["/src/a.rs", "/src/b.rs"]);

        let err = f.tab.handle("tab/focus", Some(json!({ "path": "/src/lib.rs" }))).await.unwrap_err();
        assert_eq!(code(err), -32103);
    }

    #[tokio::test]
    async fn open_missing_file_is_not_found() {
        let f = with_alpha("native").await;
        let err = f.tab.handle("tab/open", Some(json!({ "path": "/src/ghost.rs" }))).await.unwrap_err();
        assert_eq!(code(err), -32103);
    }

    #[tokio::test]
    async fn positions_round_trip() {
        let f = with_alpha("native").await;
        let position = json!({ "cursorFrom": 10, "cursorTo": 14, "topLine": 3 });
        f.tab.handle("tab/savePosition", Some(json!({ "path": "/src/lib.rs", "position": position })))
            .await.unwrap();
        let r = f.tab.handle("tab/position", Some(json!({ "path": "/src/lib.rs" }))).await.unwrap();
        assert_eq!(r["position"], position);

        let r = f.tab.handle("tab/open", Some(json!({ "path": "/src/lib.rs" }))).await.unwrap();
        assert_eq!(r["position"], position);
    }

    #[tokio::test]
    async fn deleting_file_closes_its_tab() {
        let f = with_alpha("native").await;
        f.fs.handle("fs/delete", Some(json!({ "path": "/src/" }))).await.unwrap();
        let r = f.tab.handle("tab/list", None).await.unwrap();
        assert!(paths(&r["tabs"]).is_empty());
        assert!(r["current"].is_null());
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// build/*
// ─────────────────────────────────────────────────────────────────────────────

mod build {
    use super::*;

    #[tokio::test]
    async fn files_from_src_only() {
        let f = with_alpha("native").await;
        f.fs.handle("fs/create", Some(json!({ "path": "/README.md", "content": "# hi" }))).await.unwrap();
        f.fs.handle("fs/create", Some(json!({ "path": "/src/notes.txt", "content": "x" }))).await.unwrap();

        let r = f.build.handle("build/files", None).await.unwrap();
        let files = r["files"].as_array().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0]["path"], "/src/lib.rs");
        assert_eq!(r["framework"], "native");
    }

    #[tokio::test]
    async fn program_id_is_patched_once() {
        let f = with_alpha("anchor").await;
        f.workspace.handle("workspace/setProgramId", Some(json!({ "programId": "Abc123" })))
            .await.unwrap();
        let r = f.build.handle("build/files", None).await.unwrap();
        let content = r["files"][0]["content"].as_str().unwrap();
        assert!(content.contains(r#"declare_id!("Abc123")"#));
        assert_eq!(r["programId"], "Abc123");
    }

    #[tokio::test]
    async fn pending_edits_are_included() {
        let f = with_alpha("native").await;
        f.fs.handle("fs/edit", Some(json!({ "path": "/src/lib.rs", "content": "// unsaved" })))
            .await.unwrap();
        let r = f.build.handle("build/files", None).await.unwrap();
        assert_eq!(r["files"][0]["content"], "// unsaved");
    }

    #[tokio::test]
    async fn empty_workspace_has_no_source_files() {
        let f = fixture();
        f.workspace.handle("workspace/create", Some(json!({ "name": "empty", "seed": [] })))
            .await.unwrap();
        let err = f.build.handle("build/files", None).await.unwrap_err();
        assert_eq!(code(err), -32107);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// config/*
// ─────────────────────────────────────────────────────────────────────────────

mod config {
    use super::*;
    use wcp_services::config::strip_jsonc_comments;

    #[tokio::test]
    async fn defaults() {
        let f = fixture();
        let r = f.config.handle("config/get", Some(json!({ "key": "files.autoSaveDelay" }))).await.unwrap();
        assert_eq!(r["value"], 500);
        let r = f.config.handle("config/get", Some(json!({ "key": "no.such.key" }))).await.unwrap();
        assert!(r["value"].is_null());
        let r = f.config.handle("config/schema", None).await.unwrap();
        assert!(r["schema"]["workspace.defaultFramework"].is_object());
    }

    #[tokio::test]
    async fn set_validates_known_keys() {
        let f = fixture();
        let err = f.config.handle("config/set", Some(json!({ "key": "files.autoSaveDelay", "value": "soon" })))
            .await.unwrap_err();
        assert_eq!(code(err), -32602);
        let err = f.config.handle("config/set", Some(json!({ "key": "workspace.defaultFramework", "value": "cobol" })))
            .await.unwrap_err();
        assert_eq!(code(err), -32101);

        f.config.handle("config/set", Some(json!({ "key": "editor.tabSize", "value": 2 }))).await.unwrap();
        assert_eq!(f.settings.get("editor.tabSize"), Some(json!(2)));
    }

    #[tokio::test]
    async fn autosave_delay_retunes_registry() {
        let f = with_alpha("native").await;
        f.fs.handle("fs/edit", Some(json!({ "path": "/src/lib.rs", "content": "one" }))).await.unwrap();
        assert_eq!(f.registry.lock().flush_due(std::time::Instant::now()), 0);

        f.config.handle("config/set", Some(json!({ "key": "files.autoSaveDelay", "value": 0 })))
            .await.unwrap();
        f.fs.handle("fs/edit", Some(json!({ "path": "/src/lib.rs", "content": "two" }))).await.unwrap();
        assert_eq!(f.registry.lock().flush_due(std::time::Instant::now()), 1);
        assert_eq!(f.store.get_string("items/alpha/src/lib.rs").as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn reset_restores_defaults() {
        let f = fixture();
        f.config.handle("config/set", Some(json!({ "key": "editor.fontSize", "value": 20 }))).await.unwrap();
        f.config.handle("config/set", Some(json!({ "key": "custom.flag", "value": true }))).await.unwrap();

        f.config.handle("config/reset", Some(json!({ "key": "editor.fontSize" }))).await.unwrap();
        assert_eq!(f.settings.get("editor.fontSize"), Some(json!(14)));
        assert_eq!(f.settings.get("custom.flag"), Some(json!(true)));

        f.config.handle("config/reset", None).await.unwrap();
        assert_eq!(f.settings.get("custom.flag"), None);
    }

    #[tokio::test]
    async fn init_loads_jsonc_file() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("settings.jsonc"), r#"{
            // quieter auto-save
            "files.autoSaveDelay": 1500,
            /* block */ "editor.wordWrap": "on"
        }"#).unwrap();

        let f = fixture();
        let config = ConfigService::new(f.settings.clone(), f.registry.clone(), Some(dir.path().to_path_buf()));
        config.init().await.unwrap();
        assert_eq!(f.settings.get("files.autoSaveDelay"), Some(json!(1500)));
        assert_eq!(f.settings.get("editor.wordWrap"), Some(json!("on")));
    }

    #[tokio::test]
    async fn init_rejects_malformed_file() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("settings.jsonc"), "{ not json").unwrap();
        let f = fixture();
        let config = ConfigService::new(f.settings.clone(), f.registry.clone(), Some(dir.path().to_path_buf()));
        assert!(config.init().await.is_err());
    }

    #[test]
    fn jsonc_keeps_slashes_in_strings() {
        let input = r#"{"url": "http://x/*y*/", // trailing
"n": 1}"#;
        let stripped = strip_jsonc_comments(input);
        let v: Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(v["url"], "http://x/*y*/");
        assert_eq!(v["n"], 1);
    }
}
