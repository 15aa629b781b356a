use concept_graph::utils::config::{self, CONFIG_FILE_NAME};
use std::fs;
use std::path::Path;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    fs::write(path, content).unwrap();
}

#[test]
fn parses_full_config_file() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg_path = tmp.path().join("custom.toml");
    let data = r#"
[graph]
path = "anatomy.json"
bidirectional = false

[explore]
hops = 3
depth = 6
limit_nodes = 12

[dot]
legend = false
theme = "dark"
rankdir = "TB"
splines = "ortho"
rounded = true

[query]
default_format = "json"
"#;
    write(&cfg_path, data);

    let cfg = config::load_config_at(&cfg_path).expect("config parsed");
    let graph = cfg.graph.as_ref().unwrap();
    assert_eq!(graph.path.as_deref(), Some("anatomy.json"));
    assert_eq!(graph.bidirectional, Some(false));

    let explore = cfg.explore.as_ref().unwrap();
    assert_eq!((explore.hops, explore.depth, explore.limit_nodes), (Some(3), Some(6), Some(12)));

    assert_eq!(cfg.dot.as_ref().and_then(|d| d.legend), Some(false));
    assert_eq!(cfg.dot.as_ref().and_then(|d| d.theme.as_deref()), Some("dark"));
    assert_eq!(cfg.dot.as_ref().and_then(|d| d.rankdir.as_deref()), Some("TB"));
    assert_eq!(cfg.dot.as_ref().and_then(|d| d.splines.as_deref()), Some("ortho"));
    assert_eq!(cfg.dot.as_ref().and_then(|d| d.rounded), Some(true));
    assert_eq!(cfg.query.as_ref().and_then(|q| q.default_format.as_deref()), Some("json"));
}

#[test]
fn partial_config_leaves_other_sections_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg_path = tmp.path().join("partial.toml");
    write(&cfg_path, "[explore]\nhops = 1\n");
    let cfg = config::load_config_at(&cfg_path).expect("config parsed");
    assert_eq!(cfg.explore.and_then(|e| e.hops), Some(1));
    assert!(cfg.graph.is_none());
    assert!(cfg.dot.is_none());
}

#[test]
fn invalid_or_missing_config_is_none() {
    let tmp = tempfile::tempdir().unwrap();
    let bad = tmp.path().join("bad.toml");
    write(&bad, "[explore\nhops = ");
    assert!(config::load_config_at(&bad).is_none());
    assert!(config::load_config_at(&tmp.path().join("absent.toml")).is_none());
}

#[test]
fn load_config_near_uses_default_name() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(config::load_config_near(tmp.path()).is_none());
    write(&tmp.path().join(CONFIG_FILE_NAME), "[graph]\npath = \"g.json\"\n");
    let cfg = config::load_config_near(tmp.path()).expect("found near");
    assert_eq!(cfg.graph.and_then(|g| g.path).as_deref(), Some("g.json"));
}
