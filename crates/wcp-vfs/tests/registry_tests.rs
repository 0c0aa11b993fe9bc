//! Registry tests: workspace lifecycle, tabs, auto-save, persistence, build inputs.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use wcp_vfs::*;

fn p(s: &str) -> VfsPath {
    VfsPath::parse(s).unwrap()
}

fn registry_on(store: &MemoryStore) -> WorkspaceRegistry {
    WorkspaceRegistry::init(Arc::new(store.clone()), EventBus::new(), RegistryConfig::default())
        .unwrap()
}

fn registry() -> (WorkspaceRegistry, MemoryStore) {
    let store = MemoryStore::new();
    (registry_on(&store), store)
}

fn with_alpha() -> (WorkspaceRegistry, MemoryStore) {
    let (mut reg, store) = registry();
    reg.create("alpha", Framework::Native, None).unwrap();
    (reg, store)
}

fn record(bus: &EventBus) -> Arc<Mutex<Vec<VfsEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let _ = bus.subscribe_all(move |event| sink.lock().push(event.clone()));
    events
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

// ──────────────────────────────────────────────────────────────────────
// Workspace lifecycle
// ──────────────────────────────────────────────────────────────────────

mod lifecycle {
    use super::*;

    #[test]
    fn init_on_empty_store_announces_nothing_active() {
        let bus = EventBus::new();
        let events = record(&bus);
        let reg =
            WorkspaceRegistry::init(Arc::new(MemoryStore::new()), bus, RegistryConfig::default())
                .unwrap();

        assert!(reg.names().is_empty());
        assert!(matches!(reg.current(), Err(VfsError::NoActiveWorkspace)));
        assert_eq!(
            *events.lock(),
            vec![VfsEvent::WorkspaceInitialized {
                current: None,
                workspaces: vec![],
            }]
        );
    }

    #[test]
    fn first_workspace_becomes_active_with_default_file_open() {
        let (mut reg, store) = with_alpha();
        assert_eq!(reg.current_name(), Some("alpha"));
        assert_eq!(reg.open_tabs().unwrap(), vec![p("/src/lib.rs")]);
        assert_eq!(reg.current_file().unwrap(), Some(p("/src/lib.rs")));

        assert_eq!(store.get_string("registry/active").as_deref(), Some("alpha"));
        assert!(store.get_string("items/alpha/src/lib.rs").is_some());
        assert!(store.get_string("meta/alpha").is_some());

        reg.create("beta", Framework::Anchor, None).unwrap();
        assert_eq!(reg.current_name(), Some("alpha"));
        assert_eq!(reg.names(), ["alpha".to_string(), "beta".to_string()]);
    }

    #[test]
    fn workspace_name_validation() {
        let (mut reg, _store) = with_alpha();
        let too_long = "x".repeat(33);
        for bad in ["", "   ", " lead", "trail ", "a/b", "a\\b", too_long.as_str(), SCRATCH_NAME] {
            assert!(
                matches!(reg.create(bad, Framework::Native, None), Err(VfsError::InvalidName(_))),
                "{bad:?} should be rejected"
            );
        }
        assert!(reg.create(&"x".repeat(32), Framework::Native, None).is_ok());
        assert!(reg.create("with space", Framework::Native, None).is_ok());
        assert!(matches!(
            reg.create("alpha", Framework::Native, None),
            Err(VfsError::DuplicateName(_))
        ));
    }

    #[test]
    fn custom_seed_does_not_open_tabs() {
        let (mut reg, _store) = registry();
        reg.create(
            "seeded",
            Framework::Native,
            Some(vec![
                SeedFile::new("/src/lib.rs", "// lib"),
                SeedFile::new("src/util.rs", "// util"),
            ]),
        )
        .unwrap();
        assert!(reg.open_tabs().unwrap().is_empty());
        assert_eq!(reg.read_file("/src/util.rs").unwrap(), "// util");
    }

    #[test]
    fn invalid_seed_registers_nothing() {
        let (mut reg, store) = registry();
        let err = reg
            .create("bad", Framework::Native, Some(vec![SeedFile::new("/../x.rs", "")]))
            .unwrap_err();
        assert!(matches!(err, VfsError::InvalidPath(_)));
        assert!(reg.names().is_empty());
        assert!(store.keys().is_empty());
    }

    #[test]
    fn switch_flushes_pending_edits_before_announcing() {
        let (mut reg, store) = with_alpha();
        reg.create("beta", Framework::Native, None).unwrap();

        let t0 = Instant::now();
        reg.edit_file("/src/lib.rs", "fn edited() {}".into(), t0).unwrap();
        assert_eq!(reg.pending_edits(), 1);

        let seen_in_store = Arc::new(Mutex::new(None));
        let seen = seen_in_store.clone();
        let probe = store.clone();
        let _sub = reg.bus().subscribe(EventKind::WorkspaceSwitched, move |_| {
            *seen.lock() = probe.get_string("items/alpha/src/lib.rs");
        });

        reg.switch_to("beta").unwrap();

        assert_eq!(seen_in_store.lock().as_deref(), Some("fn edited() {}"));
        assert_eq!(reg.pending_edits(), 0);
        assert_eq!(
            reg.workspace("alpha").unwrap().tree().file_content(&p("/src/lib.rs")),
            Some("fn edited() {}")
        );
        assert_eq!(store.get_string("registry/active").as_deref(), Some("beta"));
    }

    #[test]
    fn switch_to_unknown_workspace_fails() {
        let (mut reg, _store) = with_alpha();
        assert!(matches!(reg.switch_to("ghost"), Err(VfsError::NotFound(_))));
        assert_eq!(reg.current_name(), Some("alpha"));
    }

    #[test]
    fn switch_reports_previous_workspace() {
        let (mut reg, _store) = with_alpha();
        reg.create("beta", Framework::Native, None).unwrap();
        let events = record(reg.bus());

        reg.switch_to("beta").unwrap();
        reg.switch_to("beta").unwrap();

        assert_eq!(
            *events.lock(),
            vec![VfsEvent::WorkspaceSwitched {
                from: Some("alpha".into()),
                to: "beta".into(),
            }]
        );
    }

    #[test]
    fn delete_current_is_refused() {
        let (mut reg, _store) = with_alpha();
        assert!(matches!(reg.delete("alpha"), Err(VfsError::CannotDeleteCurrent(_))));
        assert!(matches!(reg.delete("ghost"), Err(VfsError::NotFound(_))));
    }

    #[test]
    fn delete_purges_stored_state() {
        let (mut reg, store) = with_alpha();
        reg.create("beta", Framework::Native, None).unwrap();
        reg.delete("beta").unwrap();

        assert_eq!(reg.names(), ["alpha".to_string()]);
        assert!(store
            .keys()
            .iter()
            .all(|key| !key.starts_with("items/beta/") && key != "meta/beta"));
        assert!(store.get_string("items/alpha/src/lib.rs").is_some());
    }

    #[test]
    fn rename_moves_stored_keys_and_active_marker() {
        let (mut reg, store) = with_alpha();
        reg.rename("alpha", "gamma").unwrap();

        assert_eq!(reg.current_name(), Some("gamma"));
        assert_eq!(reg.names(), ["gamma".to_string()]);
        assert!(store.get_string("items/gamma/src/lib.rs").is_some());
        assert!(store.keys().iter().all(|key| !key.contains("alpha")));
        assert_eq!(store.get_string("registry/active").as_deref(), Some("gamma"));

        reg.create("delta", Framework::Native, None).unwrap();
        assert!(matches!(reg.rename("gamma", "delta"), Err(VfsError::DuplicateName(_))));
        assert!(matches!(reg.rename("gamma", ""), Err(VfsError::InvalidName(_))));
    }

    #[test]
    fn state_survives_restart() {
        let (mut reg, store) = with_alpha();
        reg.create_item("/src/util.rs", Some("pub fn f() {}".into()), CreateOptions::default())
            .unwrap();
        reg.create_item("/docs/", None, CreateOptions::default()).unwrap();
        reg.open_file("/src/util.rs").unwrap();
        reg.save_position(
            "/src/util.rs",
            Position {
                cursor_from: 3,
                cursor_to: 3,
                top_line: 1,
            },
        );
        reg.set_program_id(Some("Prog1111")).unwrap();
        drop(reg);

        let reg = registry_on(&store);
        assert_eq!(reg.current_name(), Some("alpha"));
        assert_eq!(reg.read_file("/src/util.rs").unwrap(), "pub fn f() {}");
        assert_eq!(reg.item_type("/docs").unwrap(), Some(ItemKind::Directory));
        assert_eq!(reg.open_tabs().unwrap(), vec![p("/src/lib.rs"), p("/src/util.rs")]);
        assert_eq!(reg.current_file().unwrap(), Some(p("/src/util.rs")));
        assert_eq!(reg.position("/src/util.rs").unwrap().map(|pos| pos.top_line), Some(1));
        assert_eq!(reg.current().unwrap().program_id(), Some("Prog1111"));
    }

    #[test]
    fn scratch_workspace_is_never_persisted() {
        let (mut reg, store) = with_alpha();
        reg.open_scratch(Framework::Native, None).unwrap();
        assert!(reg.is_scratch_active());
        assert_eq!(reg.current_name(), Some(SCRATCH_NAME));

        let writes = store.write_count();
        reg.create_item("/src/extra.rs", None, CreateOptions::default()).unwrap();
        reg.save_file("/src/lib.rs", "// scratch".into()).unwrap();
        reg.open_file("/src/extra.rs").unwrap();
        assert_eq!(store.write_count(), writes);
        assert!(store.keys().iter().all(|key| !key.contains(SCRATCH_NAME)));

        reg.switch_to("alpha").unwrap();
        assert!(!reg.is_scratch_active());
        assert!(!reg.exists("/src/extra.rs").unwrap());
        assert_eq!(store.get_string("registry/active").as_deref(), Some("alpha"));
    }
}

// ──────────────────────────────────────────────────────────────────────
// Items
// ──────────────────────────────────────────────────────────────────────

mod items {
    use super::*;

    #[test]
    fn item_operations_are_mirrored_to_store() {
        let (mut reg, store) = with_alpha();
        reg.create_item("/src/a/b.rs", Some("b".into()), CreateOptions::default())
            .unwrap();
        assert_eq!(store.get_string("items/alpha/src/a/").as_deref(), Some(""));
        assert_eq!(store.get_string("items/alpha/src/a/b.rs").as_deref(), Some("b"));

        reg.rename_item("/src/a", "/src/c", RenameOptions::default()).unwrap();
        assert_eq!(store.get_string("items/alpha/src/c/b.rs").as_deref(), Some("b"));
        assert!(store.get_string("items/alpha/src/a/b.rs").is_none());

        reg.delete_item("/src/c/").unwrap();
        assert!(store.keys().iter().all(|key| !key.starts_with("items/alpha/src/c")));
    }

    #[test]
    fn temporary_buffers_stay_in_memory() {
        let (mut reg, store) = with_alpha();
        reg.create_item(
            "/src/buffer.rs",
            Some("draft".into()),
            CreateOptions {
                temporary_buffer: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(reg.read_file("/src/buffer.rs").unwrap(), "draft");
        assert!(store.get_string("items/alpha/src/buffer.rs").is_none());
    }

    #[test]
    fn delete_twice_emits_once() {
        let (mut reg, _store) = with_alpha();
        reg.create_item("/tests/a.rs", None, CreateOptions::default()).unwrap();
        let events = record(reg.bus());

        reg.delete_item("/tests").unwrap();
        reg.delete_item("/tests").unwrap();

        assert_eq!(
            *events.lock(),
            vec![VfsEvent::ItemDeleted {
                workspace: "alpha".into(),
                path: p("/tests/"),
            }]
        );
    }

    #[test]
    fn deleting_open_file_closes_its_tab() {
        let (mut reg, _store) = with_alpha();
        reg.delete_item("/src").unwrap();
        assert!(reg.open_tabs().unwrap().is_empty());
        assert_eq!(reg.current_file().unwrap(), None);
    }

    #[test]
    fn move_keeps_the_name() {
        let (mut reg, _store) = with_alpha();
        reg.create_item("/lib/", None, CreateOptions::default()).unwrap();
        let moved = reg.move_item("/src/lib.rs", "/lib").unwrap();
        assert_eq!(moved, p("/lib/lib.rs"));
        assert_eq!(reg.open_tabs().unwrap(), vec![p("/lib/lib.rs")]);
        assert!(!reg.exists("/src/lib.rs").unwrap());
    }

    #[test]
    fn list_orders_source_directory_first() {
        let (mut reg, _store) = with_alpha();
        reg.create_item("/app/", None, CreateOptions::default()).unwrap();
        reg.create_item("/README.md", None, CreateOptions::default()).unwrap();
        let listed: Vec<VfsPath> = reg.list("/").unwrap().iter().map(|i| i.path().clone()).collect();
        assert_eq!(listed, vec![p("/src/"), p("/app/"), p("/README.md")]);
    }

    #[test]
    fn operations_without_active_workspace_fail() {
        let (mut reg, _store) = registry();
        assert!(matches!(
            reg.create_item("/a.rs", None, CreateOptions::default()),
            Err(VfsError::NoActiveWorkspace)
        ));
        assert!(matches!(reg.build_files(), Err(VfsError::NoActiveWorkspace)));
    }
}

// ──────────────────────────────────────────────────────────────────────
// Tabs and auto-save
// ──────────────────────────────────────────────────────────────────────

mod tabs_and_autosave {
    use super::*;

    #[test]
    fn open_file_requires_a_file() {
        let (mut reg, _store) = with_alpha();
        assert!(matches!(reg.open_file("/src/"), Err(VfsError::NotFound(_))));
        assert!(matches!(reg.open_file("/nope.rs"), Err(VfsError::NotFound(_))));
    }

    #[test]
    fn open_file_returns_unflushed_content() {
        let (mut reg, _store) = with_alpha();
        reg.edit_file("/src/lib.rs", "// new".into(), Instant::now()).unwrap();
        let events = record(reg.bus());

        assert_eq!(reg.open_file("/src/lib.rs").unwrap(), "// new");
        assert_eq!(
            *events.lock(),
            vec![VfsEvent::FileOpened {
                workspace: "alpha".into(),
                path: p("/src/lib.rs"),
                content: "// new".into(),
            }]
        );
    }

    #[test]
    fn close_tab_flushes_pending_edit() {
        let (mut reg, store) = with_alpha();
        reg.edit_file("/src/lib.rs", "// closing".into(), Instant::now()).unwrap();

        assert!(reg.close_tab("/src/lib.rs").unwrap());
        assert_eq!(reg.pending_edits(), 0);
        assert_eq!(store.get_string("items/alpha/src/lib.rs").as_deref(), Some("// closing"));
        assert!(!reg.close_tab("/src/lib.rs").unwrap());
    }

    #[test]
    fn close_tab_prefers_left_neighbour() {
        let (mut reg, _store) = with_alpha();
        for path in ["/src/a.rs", "/src/b.rs"] {
            reg.create_item(path, None, CreateOptions::default()).unwrap();
            reg.open_file(path).unwrap();
        }
        reg.focus("/src/a.rs").unwrap();
        reg.close_tab("/src/a.rs").unwrap();
        assert_eq!(reg.current_file().unwrap(), Some(p("/src/lib.rs")));
        assert!(matches!(reg.focus("/src/a.rs"), Err(VfsError::NotFound(_))));
    }

    #[test]
    fn edits_wait_for_the_debounce_window() {
        let (mut reg, store) = with_alpha();
        let t0 = Instant::now();
        reg.edit_file("/src/lib.rs", "one".into(), t0).unwrap();
        reg.edit_file("/src/lib.rs", "two".into(), t0 + ms(200)).unwrap();

        assert_eq!(reg.flush_due(t0 + ms(600)), 0);
        assert_ne!(store.get_string("items/alpha/src/lib.rs").as_deref(), Some("two"));
        assert_eq!(reg.read_file("/src/lib.rs").unwrap(), "two");

        assert_eq!(reg.flush_due(t0 + ms(700)), 1);
        assert_eq!(store.get_string("items/alpha/src/lib.rs").as_deref(), Some("two"));
    }

    #[test]
    fn save_file_supersedes_pending_edit() {
        let (mut reg, store) = with_alpha();
        let t0 = Instant::now();
        reg.edit_file("/src/lib.rs", "stale".into(), t0).unwrap();
        reg.save_file("/src/lib.rs", "saved".into()).unwrap();

        assert_eq!(reg.flush_due(t0 + ms(1000)), 0);
        assert_eq!(store.get_string("items/alpha/src/lib.rs").as_deref(), Some("saved"));
    }

    #[test]
    fn pending_edit_follows_rename_and_dies_with_delete() {
        let (mut reg, store) = with_alpha();
        let t0 = Instant::now();
        reg.edit_file("/src/lib.rs", "moved".into(), t0).unwrap();
        reg.rename_item("/src/lib.rs", "/src/main.rs", RenameOptions::default())
            .unwrap();

        assert_eq!(reg.open_tabs().unwrap(), vec![p("/src/main.rs")]);
        assert_eq!(reg.read_file("/src/main.rs").unwrap(), "moved");
        assert_eq!(reg.flush_all(), 1);
        assert_eq!(store.get_string("items/alpha/src/main.rs").as_deref(), Some("moved"));
        assert!(store.get_string("items/alpha/src/lib.rs").is_none());

        reg.edit_file("/src/main.rs", "doomed".into(), t0).unwrap();
        reg.delete_item("/src/main.rs").unwrap();
        assert_eq!(reg.pending_edits(), 0);
    }

    fn overriding() -> RenameOptions {
        RenameOptions {
            allow_override: true,
            ..Default::default()
        }
    }

    #[test]
    fn rename_override_onto_open_tab_keeps_one_tab() {
        let (mut reg, _store) = with_alpha();
        let source = reg.read_file("/src/lib.rs").unwrap();
        reg.create_item("/src/b.rs", Some("b".into()), CreateOptions::default()).unwrap();
        reg.open_file("/src/b.rs").unwrap();
        reg.focus("/src/lib.rs").unwrap();

        let target = reg.rename_item("/src/lib.rs", "/src/b.rs", overriding()).unwrap();
        assert_eq!(target, p("/src/b.rs"));
        assert_eq!(reg.open_tabs().unwrap(), vec![p("/src/b.rs")]);
        assert_eq!(reg.current_file().unwrap(), Some(p("/src/b.rs")));
        assert_eq!(reg.read_file("/src/b.rs").unwrap(), source);

        assert!(reg.close_tab("/src/b.rs").unwrap());
        assert!(reg.open_tabs().unwrap().is_empty());
        assert_eq!(reg.current_file().unwrap(), None);
    }

    #[test]
    fn directory_override_merges_open_tabs() {
        let (mut reg, _store) = with_alpha();
        for path in ["/a/x.rs", "/b/x.rs", "/b/y.rs"] {
            reg.create_item(path, None, CreateOptions::default()).unwrap();
            reg.open_file(path).unwrap();
        }
        reg.focus("/a/x.rs").unwrap();

        reg.rename_item("/a", "/b", overriding()).unwrap();
        assert_eq!(reg.open_tabs().unwrap(), vec![p("/src/lib.rs"), p("/b/x.rs")]);
        assert_eq!(reg.current_file().unwrap(), Some(p("/b/x.rs")));
        assert!(!reg.exists("/b/y.rs").unwrap());

        assert!(reg.close_tab("/b/x.rs").unwrap());
        assert_eq!(reg.open_tabs().unwrap(), vec![p("/src/lib.rs")]);
    }

    #[test]
    fn rename_override_discards_destination_pending_edit() {
        let (mut reg, store) = with_alpha();
        let t0 = Instant::now();
        let source = reg.read_file("/src/lib.rs").unwrap();
        reg.create_item("/src/b.rs", Some("b".into()), CreateOptions::default()).unwrap();
        reg.edit_file("/src/b.rs", "dest draft".into(), t0).unwrap();

        reg.rename_item("/src/lib.rs", "/src/b.rs", overriding()).unwrap();
        assert_eq!(reg.pending_edits(), 0);
        assert_eq!(reg.read_file("/src/b.rs").unwrap(), source);
        assert_eq!(reg.flush_all(), 0);
        assert_eq!(store.get_string("items/alpha/src/b.rs"), Some(source));
        assert!(store.get_string("items/alpha/src/lib.rs").is_none());
    }

    #[test]
    fn rename_override_keeps_source_pending_edit() {
        let (mut reg, store) = with_alpha();
        let t0 = Instant::now();
        reg.create_item("/src/b.rs", Some("b".into()), CreateOptions::default()).unwrap();
        reg.edit_file("/src/lib.rs", "source draft".into(), t0).unwrap();
        reg.edit_file("/src/b.rs", "dest draft".into(), t0).unwrap();

        reg.rename_item("/src/lib.rs", "/src/b.rs", overriding()).unwrap();
        assert_eq!(reg.pending_edits(), 1);
        assert_eq!(reg.read_file("/src/b.rs").unwrap(), "source draft");
        assert_eq!(reg.flush_all(), 1);
        assert_eq!(store.get_string("items/alpha/src/b.rs").as_deref(), Some("source draft"));
    }

    #[test]
    fn save_position_never_fails() {
        let pos = Position {
            cursor_from: 1,
            cursor_to: 2,
            top_line: 0,
        };
        let (mut reg, store) = registry();
        let writes = store.write_count();
        reg.save_position("/src/lib.rs", pos);
        assert_eq!(store.write_count(), writes);

        let (mut reg, _store) = with_alpha();
        reg.save_position("/../escape.rs", pos);
        reg.save_position("/src/closed.rs", pos);
        assert_eq!(reg.position("/src/closed.rs").unwrap(), None);

        reg.save_position("/src/lib.rs", pos);
        assert_eq!(reg.position("/src/lib.rs").unwrap(), Some(pos));
    }

    #[test]
    fn edit_of_missing_file_fails() {
        let (mut reg, _store) = with_alpha();
        assert!(matches!(
            reg.edit_file("/ghost.rs", String::new(), Instant::now()),
            Err(VfsError::NotFound(_))
        ));
    }
}

// ──────────────────────────────────────────────────────────────────────
// Persistence failures
// ──────────────────────────────────────────────────────────────────────

mod persistence_failures {
    use super::*;

    #[test]
    fn store_failures_become_warnings() {
        let (mut reg, store) = with_alpha();
        store.fail_writes(true);

        reg.create_item("/src/new.rs", Some("x".into()), CreateOptions::default())
            .unwrap();
        assert_eq!(reg.read_file("/src/new.rs").unwrap(), "x");

        let warnings = reg.take_warnings();
        assert!(warnings.iter().any(|w| w.key == "items/alpha/src/new.rs"));
        assert!(reg.take_warnings().is_empty());
    }
}

// ──────────────────────────────────────────────────────────────────────
// Build inputs
// ──────────────────────────────────────────────────────────────────────

mod build_inputs {
    use super::*;

    #[test]
    fn build_selects_source_files_only() {
        let (mut reg, _store) = with_alpha();
        reg.create_item("/src/notes.md", None, CreateOptions::default()).unwrap();
        reg.create_item("/tests/t.rs", None, CreateOptions::default()).unwrap();
        reg.create_item("/src/nested/mod.rs", None, CreateOptions::default()).unwrap();

        let paths: Vec<VfsPath> = reg.build_files().unwrap().into_iter().map(|f| f.path).collect();
        assert_eq!(paths, vec![p("/src/lib.rs"), p("/src/nested/mod.rs")]);
    }

    #[test]
    fn program_id_patches_only_the_first_candidate() {
        let (mut reg, _store) = registry();
        reg.create("anchor", Framework::Anchor, None).unwrap();
        reg.create_item(
            "/src/id.rs",
            Some("declare_id!(\"11111111111111111111111111111111\");\n".into()),
            CreateOptions::default(),
        )
        .unwrap();
        reg.set_program_id(Some("Prog1111")).unwrap();

        let files = reg.build_files().unwrap();
        let lib = files.iter().find(|f| f.path == p("/src/lib.rs")).unwrap();
        let id = files.iter().find(|f| f.path == p("/src/id.rs")).unwrap();
        assert!(lib.content.contains("declare_id!(\"Prog1111\");"));
        assert!(!lib.content.contains("1111111111111111111111111111111"));
        assert!(id.content.contains("11111111111111111111111111111111"));

        // The tree itself is untouched.
        assert!(reg
            .read_file("/src/lib.rs")
            .unwrap()
            .contains("11111111111111111111111111111111"));
        assert_eq!(reg.build_files().unwrap(), files);
    }

    #[test]
    fn id_file_is_patched_when_lib_has_no_declaration() {
        let (mut reg, _store) = registry();
        reg.create(
            "split",
            Framework::Anchor,
            Some(vec![
                SeedFile::new("/src/lib.rs", "mod id;\n"),
                SeedFile::new("/src/id.rs", "anchor_lang::declare_id!(\"old\");\n"),
            ]),
        )
        .unwrap();
        reg.set_program_id(Some("New1")).unwrap();

        let files = reg.build_files().unwrap();
        assert_eq!(files[0].path, p("/src/id.rs"));
        assert_eq!(files[0].content, "anchor_lang::declare_id!(\"New1\");\n");
        assert_eq!(files[1].content, "mod id;\n");
    }

    #[test]
    fn seahorse_uses_python_declaration() {
        let (mut reg, _store) = registry();
        reg.create("sea", Framework::Seahorse, None).unwrap();
        reg.set_program_id(Some("Sea123")).unwrap();

        let files = reg.build_files().unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].content.contains("declare_id('Sea123')"));
    }

    #[test]
    fn build_without_program_id_is_verbatim_and_includes_pending() {
        let (mut reg, _store) = with_alpha();
        reg.edit_file("/src/lib.rs", "// pending".into(), Instant::now()).unwrap();
        let files = reg.build_files().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].content, "// pending");
    }

    #[test]
    fn build_with_no_sources_fails() {
        let (mut reg, _store) = registry();
        reg.create("docs", Framework::Native, Some(vec![SeedFile::new("/README.md", "hi")]))
            .unwrap();
        assert!(matches!(reg.build_files(), Err(VfsError::NoSourceFiles)));
    }

    #[test]
    fn scratch_build_takes_files_anywhere() {
        let (mut reg, _store) = registry();
        reg.open_scratch(Framework::Native, Some(vec![SeedFile::new("/main.rs", "fn main() {}")]))
            .unwrap();
        let files = reg.build_files().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, p("/main.rs"));
    }

    #[test]
    fn program_id_must_be_alphanumeric() {
        let (mut reg, _store) = with_alpha();
        assert!(matches!(reg.set_program_id(Some("bad id")), Err(VfsError::InvalidName(_))));
        assert!(matches!(reg.set_program_id(Some("")), Err(VfsError::InvalidName(_))));
        assert!(reg.set_program_id(None).is_ok());
    }
}
