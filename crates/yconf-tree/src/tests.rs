use super::*;

#[test]
fn test_parse_simple() {
    let tree = parse("name: Alice\nage: 30").unwrap();
    assert_eq!(tree.lookup_str("name"), Ok("Alice"));
    assert_eq!(tree.lookup_int("age"), Ok(30));
}

#[test]
fn test_parse_empty() {
    let tree = parse("").unwrap();
    assert!(tree.root().is_dict());
    assert_eq!(tree.root().child_count(), 0);

    let tree = parse("# nothing here\n---\n").unwrap();
    assert_eq!(tree.root().child_count(), 0);
}

#[test]
fn test_config_scenario() {
    let source = "root-key:\n  key-1: v1\n  key-6: 0.23";
    let tree = parse(source).unwrap();
    assert!(tree.resolve("root-key").is_some());
    assert_eq!(tree.lookup_str("root-key:key-1"), Ok("v1"));
    assert_eq!(tree.lookup_float("root-key:key-6"), Ok(0.23));
    assert_eq!(
        tree.lookup("invalid").map(|n| n.id()),
        Err(LookupError::NotFound {
            path: "invalid".into()
        })
    );
}

#[test]
fn test_sequence_scenario() {
    let tree = parse("items:\n  - a\n  - b").unwrap();
    let items = tree.lookup("items").unwrap();
    assert!(items.is_list());
    assert_eq!(items.list_len(), Ok(2));
    let texts: Vec<_> = items.children().map(|c| c.as_str().unwrap()).collect();
    assert_eq!(texts, vec!["a", "b"]);
}

#[test]
fn test_order_preserved() {
    let tree = parse("z: 1\na: 2\nm: 3\n").unwrap();
    let keys: Vec<_> = tree.root().children().filter_map(|c| c.key()).collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

#[test]
fn test_parent_links() {
    let tree = parse("outer:\n  inner:\n    - leaf\n").unwrap();
    let leaf = tree
        .lookup("outer:inner")
        .unwrap()
        .list_elt(0)
        .unwrap()
        .unwrap();
    let chain: Vec<_> = std::iter::successors(Some(leaf), |n| n.parent())
        .map(|n| n.key())
        .collect();
    assert_eq!(chain, vec![None, Some("inner"), Some("outer"), None]);
    assert!(leaf.parent().unwrap().parent().unwrap().parent().unwrap().is_root());
}

#[test]
fn test_tree_debug_snapshot() {
    let source = r#"
server:
  host: "example.com"
  ports: [80, 443]
users:
  - name: ana
    admin: yes
  - name: ben
empty:
flags: {}
"#;
    let tree = parse(source).unwrap();
    insta::assert_debug_snapshot!(tree, @r#"
    {
        "server": {
            "host": "example.com",
            "ports": [
                "80",
                "443",
            ],
        },
        "users": [
            {
                "name": "ana",
                "admin": "yes",
            },
            {
                "name": "ben",
            },
        ],
        "empty": "",
        "flags": {},
    }
    "#);
}

#[test]
fn test_list_root() {
    let tree = parse("- a\n- [b, c]\n").unwrap();
    assert!(tree.root().is_list());
    assert_eq!(tree.root().child_count(), 2);
    // A list root has no keyed children to resolve.
    assert!(tree.resolve("a").is_none());
}

#[test]
fn test_failure_is_all_or_nothing() {
    assert!(parse("a: 1\nb: [1, 2\n").is_err());
    assert!(matches!(
        parse("a:\n  - x\n  y: 1\n"),
        Err(BuildError::Scan { .. })
    ));
    assert!(matches!(parse("plain"), Err(BuildError::Malformed { .. })));
}

#[test]
fn test_content_after_flow_root_fails() {
    let err = parse("[a]\nb: 1\n").unwrap_err();
    assert_eq!(err.to_string(), "unexpected content after the document root");
}

#[test]
fn test_read_and_from_str() {
    let tree = Tree::read("a: 1\n".as_bytes()).unwrap();
    let other: Tree = "a: 1".parse().unwrap();
    assert_eq!(tree, other);

    let err = read_file("/nonexistent/definitely/missing.yaml").unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}
