use std::sync::Arc;

use super::*;
use crate::ids;
use crate::test_utils::test_server;
use crate::test_utils::TEST_NAMESPACE;
use crate::AddressSpaceError;
use crate::Error;
use crate::NodeClass;
use crate::QualifiedName;
use crate::Server;
use crate::StatusCode;
use crate::Variant;

fn create_tree() -> (Arc<Server>, ServerNodeTree) {
    let (server, _) = test_server();
    let ns = server.add_namespace(TEST_NAMESPACE);
    let tree = ServerNodeTree::new(server.clone(), ids::OBJECTS_FOLDER, ns);
    (server, tree)
}

#[test]
fn create_folder_path_is_idempotent() {
    let (server, tree) = create_tree();
    let path = NodePath::parse("A/B/C");

    let first = tree.create_folder_path(&ids::OBJECTS_FOLDER, &path).unwrap();
    let count = server.node_count();
    let second = tree.create_folder_path(&ids::OBJECTS_FOLDER, &path).unwrap();

    assert_eq!(first, second);
    assert_eq!(server.node_count(), count);
    let map = tree.browse_tree_map(&ids::OBJECTS_FOLDER).unwrap();
    assert_eq!(map.keys().filter(|k| k.ends_with('A')).count(), 1);
    assert_eq!(map["A.B.C"], first);
}

#[test]
fn create_folder_path_extends_existing_prefix() {
    let (_, tree) = create_tree();

    let ab = tree
        .create_folder_path(&ids::OBJECTS_FOLDER, &NodePath::parse("A.B"))
        .unwrap();
    let abd = tree
        .create_folder_path(&ids::OBJECTS_FOLDER, &NodePath::parse("A/B/D"))
        .unwrap();

    assert_eq!(tree.get_child(&ab, "D").unwrap(), abd);
}

#[test]
fn empty_path_resolves_to_start() {
    let (_, tree) = create_tree();

    let leaf = tree.create_folder_path(&ids::OBJECTS_FOLDER, &NodePath::new()).unwrap();

    assert_eq!(leaf, ids::OBJECTS_FOLDER);
}

#[test]
fn set_node_value_creates_then_overwrites() {
    let (_, tree) = create_tree();
    let path = NodePath::parse("Plant/Line");

    let created = tree.set_node_value(&path, "Speed", 10).unwrap();
    let updated = tree.set_node_value(&path, "Speed", 20).unwrap();

    assert_eq!(created, updated);
    assert_eq!(tree.get_node_value(&path, "Speed").unwrap(), Variant::from(20));
    assert_eq!(tree.get_value(&created).unwrap(), Variant::from(20));
}

#[test]
fn missing_path_is_no_match() {
    let (_, tree) = create_tree();

    let err = tree
        .node_id_from_path(&ids::OBJECTS_FOLDER, &NodePath::parse("Nowhere/Else"))
        .unwrap_err();

    assert!(matches!(
        err,
        Error::AddressSpace(AddressSpaceError::NoMatch { .. })
    ));
}

#[test]
fn value_nodes_round_trip() {
    let (_, tree) = create_tree();
    let folder = tree.add_folder_node(&ids::OBJECTS_FOLDER, "Values").unwrap();
    let node = tree.add_value_node(&folder, "Label", "idle").unwrap();

    tree.set_value(&node, "busy").unwrap();

    assert_eq!(tree.get_value(&node).unwrap(), Variant::from("busy"));
    assert_eq!(
        tree.set_value(&node, 5).unwrap_err().status_code(),
        StatusCode::BAD_TYPE_MISMATCH
    );
}

#[test]
fn browse_tree_mirrors_structure_and_values() {
    let (_, tree) = create_tree();
    tree.set_node_value(&NodePath::parse("Plant"), "Speed", 3.5f64).unwrap();
    tree.set_node_value(&NodePath::parse("Plant/Line"), "Count", 7).unwrap();

    let plant = tree.node_id_from_path(&ids::OBJECTS_FOLDER, &NodePath::parse("Plant")).unwrap();
    let snapshot = tree.browse_tree(&plant, true).unwrap();

    assert_eq!(snapshot.name, "Plant");
    assert_eq!(snapshot.node_class, NodeClass::Object);
    assert_eq!(snapshot.len(), 4);
    assert_eq!(snapshot.child("Speed").unwrap().value, Some(Variant::from(3.5f64)));
    let count = snapshot.find(&NodePath::parse("Line/Count")).unwrap();
    assert_eq!(count.value, Some(Variant::from(7)));
    assert!(count.is_leaf());

    let without_values = tree.browse_tree(&plant, false).unwrap();
    assert_eq!(without_values.child("Speed").unwrap().value, None);
}

#[test]
fn browse_tree_terminates_on_cycles() {
    let (server, tree) = create_tree();
    let a = tree
        .create_folder_path(&ids::OBJECTS_FOLDER, &NodePath::parse("A"))
        .unwrap();
    let b = tree.create_folder_path(&a, &NodePath::parse("B")).unwrap();
    server.add_reference(&b, &ids::ORGANIZES, a.clone(), true).unwrap();

    let snapshot = tree.browse_tree(&a, false).unwrap();

    assert_eq!(snapshot.len(), 2);
    assert_eq!(tree.browse_tree_map(&a).unwrap().len(), 1);
}

#[test]
fn browse_children_lists_direct_children_only() {
    let (_, tree) = create_tree();
    tree.set_node_value(&NodePath::parse("Root"), "X", 1).unwrap();
    tree.set_node_value(&NodePath::parse("Root/Sub"), "Y", 2).unwrap();
    let root = tree.node_id_from_path(&ids::OBJECTS_FOLDER, &NodePath::parse("Root")).unwrap();

    let children = tree.browse_children(&root).unwrap();

    assert_eq!(children.keys().cloned().collect::<Vec<_>>(), vec!["Sub", "X"]);
}

#[test]
fn delete_tree_removes_the_whole_subtree() {
    let (server, tree) = create_tree();
    tree.set_node_value(&NodePath::parse("Doomed/Inner"), "V", 1).unwrap();
    let doomed = tree.node_id_from_path(&ids::OBJECTS_FOLDER, &NodePath::parse("Doomed")).unwrap();
    let before = server.node_count();

    let removed = tree.delete_tree(&doomed).unwrap();

    assert_eq!(removed, 3);
    assert_eq!(server.node_count(), before - 3);
    assert!(!server.node_exists(&doomed));
    assert!(tree.get_child(&ids::OBJECTS_FOLDER, "Doomed").is_err());
}

#[test]
fn tree_uses_its_namespace_for_browse_names() {
    let (server, tree) = create_tree();
    let folder = tree.add_folder_node(&ids::OBJECTS_FOLDER, "Scoped").unwrap();

    assert_eq!(
        server.read_browse_name(&folder).unwrap(),
        QualifiedName::new(tree.namespace(), "Scoped")
    );
    assert_eq!(folder.namespace(), tree.namespace());
}
