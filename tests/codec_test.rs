//! File round-trips through TreeService for every supported format.

use std::sync::Arc;

use rstest::rstest;
use tempfile::TempDir;

use rbtrace::application::services::TreeService;
use rbtrace::application::ApplicationError;
use rbtrace::domain::{Color, Key, KeyKind, NullSink, RecordingSink, TreeEvent};
use rbtrace::infrastructure::traits::RealFileSystem;
use rbtrace::util::testing;

fn service(kind: KeyKind) -> TreeService {
    TreeService::new(Arc::new(RealFileSystem), kind, true)
}

/// In-order (key, color) pairs of the live tree.
fn shape(svc: &TreeService) -> Vec<(Key, Color)> {
    svc.tree()
        .iter()
        .filter_map(|(_, node)| node.key().map(|k| (k.clone(), node.color())))
        .collect()
}

#[rstest]
#[case("tree.txt")]
#[case("tree.bin")]
#[case("tree.dat")]
#[case("tree.json")]
#[case("tree.XML")]
fn given_numeric_tree_when_round_tripping_then_shape_preserved(#[case] name: &str) {
    testing::init_test_setup();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join(name);

    let mut source = service(KeyKind::Number);
    for k in ["50", "20", "80", "10", "30", "70", "90", "-5", "25"] {
        source.insert(k, &mut NullSink).unwrap();
    }
    source.delete("80", &mut NullSink).unwrap();
    source.export_tree(&path).unwrap();

    let mut target = service(KeyKind::Char);
    let mut sink = RecordingSink::new();
    target.import_tree(&path, &mut sink).unwrap();

    assert_eq!(target.key_kind(), KeyKind::Number);
    assert_eq!(shape(&target), shape(&source));
    assert_eq!(target.height(), source.height());
    assert!(target.is_verified());
    assert_eq!(
        sink.events(),
        &[
            TreeEvent::TreeReplaced { node_count: 8 },
            TreeEvent::HeightChanged {
                height: source.height()
            },
            TreeEvent::NodeCountChanged { count: 8 },
        ]
    );
}

#[rstest]
#[case("keys.txt")]
#[case("keys.bin")]
#[case("keys.json")]
#[case("keys.xml")]
fn given_text_tree_when_round_tripping_then_keys_survive(#[case] name: &str) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(name);

    let mut source = service(KeyKind::Text);
    for k in ["m", "Ab", "zz", "q", "abc"] {
        source.insert(k, &mut NullSink).unwrap();
    }
    source.export_tree(&path).unwrap();

    let mut target = service(KeyKind::Number);
    target.import_tree(&path, &mut NullSink).unwrap();
    assert_eq!(shape(&target), shape(&source));
    assert!(target.find("abc", &mut NullSink).unwrap());
}

#[test]
fn given_hand_written_text_file_when_importing_then_tree_matches() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("given.txt");
    std::fs::write(&path, "N\n5 B 3 R NIL NIL 8 R NIL NIL").unwrap();

    let mut svc = service(KeyKind::Number);
    svc.import_tree(&path, &mut NullSink).unwrap();

    assert_eq!(svc.node_count(), 3);
    assert_eq!(svc.height(), 2);
    assert_eq!(
        shape(&svc),
        vec![
            (Key::Integer(3), Color::Red),
            (Key::Integer(5), Color::Black),
            (Key::Integer(8), Color::Red),
        ]
    );
}

#[test]
fn given_file_breaking_black_height_when_importing_then_previous_tree_queryable() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bad.json");
    std::fs::write(
        &path,
        r#"{
  "dataType": "N",
  "tree": [
    { "value": 5, "color": "B", "left": 1, "right": null },
    { "value": 3, "color": "B", "left": null, "right": null }
  ]
}"#,
    )
    .unwrap();

    let mut svc = service(KeyKind::Number);
    svc.insert("42", &mut NullSink).unwrap();
    let mut sink = RecordingSink::new();

    let err = svc.import_tree(&path, &mut sink).unwrap_err();

    assert!(matches!(err, ApplicationError::Validation { .. }));
    assert!(matches!(sink.events(), [TreeEvent::ValidationError { .. }]));
    assert!(svc.find("42", &mut NullSink).unwrap());
    assert!(svc.insert("43", &mut NullSink).is_ok());
}

#[test]
fn given_unknown_extension_when_exporting_then_unsupported_format() {
    let temp = TempDir::new().unwrap();
    let mut svc = service(KeyKind::Number);
    svc.insert("1", &mut NullSink).unwrap();

    let err = svc.export_tree(&temp.path().join("tree.yaml")).unwrap_err();
    assert!(matches!(err, ApplicationError::UnsupportedFormat(_)));
    assert!(!temp.path().join("tree.yaml").exists());
}
