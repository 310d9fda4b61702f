//! End-to-end discovery over real directory trees

use parking_lot::Mutex;
use plug_discovery::{
    discover, discover_with, CallbackSink, DiscoverySink, Dispatcher, PluginKind, PluginRecord,
    PluginRegistry,
};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

#[derive(Default)]
struct Collected {
    visited: Mutex<HashSet<String>>,
    reads: Mutex<usize>,
    records: Mutex<Vec<PluginRecord>>,
}

impl DiscoverySink for Collected {
    fn is_unvisited(&self, manifest_path: &str) -> bool {
        let fresh = self.visited.lock().insert(manifest_path.to_string());
        if fresh {
            *self.reads.lock() += 1;
        }
        fresh
    }

    fn accept(&self, record: PluginRecord) {
        self.records.lock().push(record);
    }
}

impl Collected {
    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.records.lock().iter().map(|r| r.name.clone()).collect();
        names.sort();
        names
    }
}

fn write(path: &Path, content: &str) -> bool {
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return false;
        }
    }
    fs::write(path, content).is_ok()
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// `root/plugInfo.json` holds resource `r1` and includes `sub/`, which holds python `p1`
fn nested_fixture(root: &Path) -> bool {
    let top = r#"{
        # resources shipped next to the manifest
        "Plugins": [{"Type": "resource", "Name": "r1", "Info": {}}],
        "Includes": ["sub/"]
    }"#;
    let sub = r#"{"Plugins": [{"Type": "python", "Name": "p1", "Info": {}}]}"#;
    write(&root.join("plugInfo.json"), top) && write(&root.join("sub").join("plugInfo.json"), sub)
}

fn run(dispatcher: &Dispatcher, sink: &Arc<Collected>, paths: &[String]) {
    discover_with(
        dispatcher,
        paths,
        Arc::clone(sink) as Arc<dyn DiscoverySink>,
    );
}

#[test]
fn test_includes_are_followed() {
    let Ok(temp_dir) = TempDir::new() else {
        return;
    };
    let root = temp_dir.path();
    assert!(nested_fixture(root));

    let pooled = Dispatcher::with_thread_limit(4).unwrap_or_else(|_| Dispatcher::synchronous());
    for dispatcher in [Dispatcher::synchronous(), pooled] {
        let sink = Arc::new(Collected::default());
        run(&dispatcher, &sink, &[path_str(root)]);

        assert_eq!(sink.names(), vec!["p1".to_string(), "r1".to_string()]);
        assert_eq!(*sink.reads.lock(), 2);

        let records = sink.records.lock();
        let p1 = records.iter().find(|r| r.name == "p1");
        assert!(p1.is_some_and(|p1| p1.kind == PluginKind::Python));
        assert!(p1.is_some_and(|p1| p1.resource_path == format!("{}/sub", path_str(root))));
    }
}

#[test]
fn test_second_run_reads_nothing() {
    let Ok(temp_dir) = TempDir::new() else {
        return;
    };
    let root = temp_dir.path();
    assert!(nested_fixture(root));

    let sink = Arc::new(Collected::default());
    let dispatcher = Dispatcher::synchronous();
    run(&dispatcher, &sink, &[path_str(root)]);
    assert_eq!(*sink.reads.lock(), 2);

    run(&dispatcher, &sink, &[path_str(root)]);
    assert_eq!(*sink.reads.lock(), 2);
    assert_eq!(sink.records.lock().len(), 2);
}

#[test]
fn test_cyclic_includes_terminate() {
    let Ok(temp_dir) = TempDir::new() else {
        return;
    };
    let root = temp_dir.path();
    let a = r#"{"Plugins": [{"Type": "resource", "Name": "a", "Info": {}}], "Includes": ["../b/"]}"#;
    let b = r#"{"Plugins": [{"Type": "resource", "Name": "b", "Info": {}}], "Includes": ["../a/"]}"#;
    assert!(write(&root.join("a").join("plugInfo.json"), a));
    assert!(write(&root.join("b").join("plugInfo.json"), b));

    let sink = Arc::new(Collected::default());
    let dispatcher = Dispatcher::with_thread_limit(2).unwrap_or_else(|_| Dispatcher::synchronous());
    run(&dispatcher, &sink, &[path_str(&root.join("a"))]);

    assert_eq!(sink.names(), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(*sink.reads.lock(), 2);
}

#[test]
fn test_many_manifests_concurrently() {
    let Ok(temp_dir) = TempDir::new() else {
        return;
    };
    let root = temp_dir.path();
    let mut includes = Vec::new();
    for index in 0..40 {
        let dir = format!("pkg{index:02}");
        let content = format!(
            r#"{{"Plugins": [{{"Type": "resource", "Name": "res{index:02}", "Info": {{}}}}]}}"#
        );
        assert!(write(&root.join(&dir).join("plugInfo.json"), &content));
        includes.push(format!("\"{dir}/\""));
    }
    let top = format!(r#"{{"Includes": [{}]}}"#, includes.join(", "));
    assert!(write(&root.join("plugInfo.json"), &top));

    let sink = Arc::new(Collected::default());
    let dispatcher = Dispatcher::with_thread_limit(8).unwrap_or_else(|_| Dispatcher::synchronous());
    run(&dispatcher, &sink, &[path_str(root)]);

    assert_eq!(sink.records.lock().len(), 40);
    assert_eq!(*sink.reads.lock(), 41);
}

#[test]
fn test_recursive_include_takes_first_match_per_directory() {
    let Ok(temp_dir) = TempDir::new() else {
        return;
    };
    let root = temp_dir.path();
    let resource = |name: &str| {
        format!(r#"{{"Plugins": [{{"Type": "resource", "Name": "{name}", "Info": {{}}}}]}}"#)
    };
    assert!(write(&root.join("plugInfo.json"), r#"{"Includes": ["tree/**/"]}"#));
    assert!(write(&root.join("tree").join("x").join("plugInfo.json"), &resource("x")));
    assert!(write(&root.join("tree").join("x").join("y").join("plugInfo.json"), &resource("y")));
    assert!(write(&root.join("tree").join("z").join("w").join("plugInfo.json"), &resource("w")));

    let sink = Arc::new(Collected::default());
    run(&Dispatcher::synchronous(), &sink, &[path_str(root)]);

    assert_eq!(sink.names(), vec!["w".to_string(), "x".to_string()]);
}

#[test]
fn test_missing_and_malformed_manifests_are_skipped() {
    let Ok(temp_dir) = TempDir::new() else {
        return;
    };
    let root = temp_dir.path();
    assert!(write(&root.join("bad").join("plugInfo.json"), "{ not json"));
    assert!(write(
        &root.join("good").join("plugInfo.json"),
        r#"{"Plugins": [{"Type": "resource", "Name": "good", "Info": {}}]}"#
    ));

    let sink = Arc::new(Collected::default());
    let paths = [
        path_str(&root.join("missing")),
        path_str(&root.join("bad")),
        path_str(&root.join("good")),
        "relative/path".to_string(),
    ];
    run(&Dispatcher::synchronous(), &sink, &paths);

    assert_eq!(sink.names(), vec!["good".to_string()]);
}

#[test]
fn test_discover_with_closures() {
    let Ok(temp_dir) = TempDir::new() else {
        return;
    };
    let root = temp_dir.path();
    assert!(nested_fixture(root));

    let visited = Arc::new(Mutex::new(HashSet::new()));
    let accepted = Arc::new(Mutex::new(Vec::new()));
    let visited_check = Arc::clone(&visited);
    let accepted_sink = Arc::clone(&accepted);

    discover(
        &[path_str(root)],
        move |path: &str| visited_check.lock().insert(path.to_string()),
        move |record: PluginRecord| accepted_sink.lock().push(record.name),
    );

    let mut names = accepted.lock().clone();
    names.sort();
    assert_eq!(names, vec!["p1".to_string(), "r1".to_string()]);
    assert_eq!(visited.lock().len(), 2);
}

#[test]
fn test_callback_sink_matches_registry() {
    let Ok(temp_dir) = TempDir::new() else {
        return;
    };
    let root = temp_dir.path();
    assert!(nested_fixture(root));

    let registry = Arc::new(PluginRegistry::new());
    let added = registry.register_plugins(&[path_str(root)]);
    assert_eq!(added.len(), 2);

    let count = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&count);
    let sink = CallbackSink::new(
        |_: &str| true,
        move |_: PluginRecord| *counter.lock() += 1,
    );
    discover_with(&Dispatcher::synchronous(), &[path_str(root)], Arc::new(sink));
    assert_eq!(*count.lock(), registry.len());
}
