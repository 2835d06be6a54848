mod common;

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use common::create_server;
use common::start_host;
use common::Idle;
use common::TEST_NAMESPACE;
use ua_space::ids;
use ua_space::AddNodeItem;
use ua_space::AddressSpaceError;
use ua_space::Argument;
use ua_space::AttributeId;
use ua_space::CallbackState;
use ua_space::Error;
use ua_space::FnMethod;
use ua_space::MethodError;
use ua_space::MethodSignature;
use ua_space::NodeId;
use ua_space::NodePath;
use ua_space::QualifiedName;
use ua_space::RelativePathElement;
use ua_space::Request;
use ua_space::RequestContext;
use ua_space::Response;
use ua_space::ServerNodeTree;
use ua_space::StatusCode;
use ua_space::VariableAttributes;
use ua_space::Variant;

#[tokio::test]
async fn test_add_node_with_null_id_gets_fresh_id() {
    let server = create_server();
    let ns = server.add_namespace(TEST_NAMESPACE);
    let before = server.node_count();

    let id = server
        .add_node(AddNodeItem::new(
            ids::OBJECTS_FOLDER,
            QualifiedName::new(ns, "X"),
            VariableAttributes::new(1),
        ))
        .unwrap();

    assert!(!id.is_null());
    assert!(server.node_exists(&id));
    assert_eq!(server.node_count(), before + 1);
    assert_eq!(server.find_child(&ids::OBJECTS_FOLDER, QualifiedName::new(ns, "X")).unwrap(), id);
}

#[tokio::test]
async fn test_create_folder_path_is_idempotent() {
    let server = create_server();
    let ns = server.add_namespace(TEST_NAMESPACE);
    let tree = ServerNodeTree::new(server.clone(), ids::OBJECTS_FOLDER, ns);
    let path = NodePath::parse("A/B/C");

    let first = tree.create_folder_path(&ids::OBJECTS_FOLDER, &path).unwrap();
    let count = server.node_count();
    let second = tree.create_folder_path(&ids::OBJECTS_FOLDER, &path).unwrap();

    assert_eq!(first, second);
    assert_eq!(server.node_count(), count);
    assert_eq!(tree.node_id_from_path(&ids::OBJECTS_FOLDER, &path).unwrap(), first);
}

#[tokio::test]
async fn test_write_then_read_returns_written_value() {
    let server = create_server();
    let ns = server.add_namespace(TEST_NAMESPACE);
    let node = server
        .add_variable(
            &ids::OBJECTS_FOLDER,
            QualifiedName::new(ns, "Level"),
            NodeId::auto(ns),
            VariableAttributes::new(0.0f64),
        )
        .unwrap();

    server.write_value(&node, 12.5f64).unwrap();

    assert_eq!(server.read_value(&node).unwrap(), Variant::from(12.5f64));
}

#[tokio::test]
async fn test_deleted_node_is_unknown() {
    let server = create_server();
    let ns = server.add_namespace(TEST_NAMESPACE);
    let node = server
        .add_folder(&ids::OBJECTS_FOLDER, QualifiedName::new(ns, "Gone"), NodeId::auto(ns))
        .unwrap();

    server.delete_node(&node, true).unwrap();

    assert!(!server.node_exists(&node));
    match server.read_attribute(&node, AttributeId::BrowseName) {
        Err(Error::AddressSpace(AddressSpaceError::NodeNotFound(id))) => assert_eq!(id, node),
        other => panic!("expected NodeNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_translate_with_two_matching_children_is_ambiguous() {
    let server = create_server();
    let ns = server.add_namespace(TEST_NAMESPACE);
    let name = QualifiedName::new(ns, "Twin");
    // Same browse name below one parent, reached over Organizes and HasComponent
    server
        .add_folder(&ids::OBJECTS_FOLDER, name.clone(), NodeId::auto(ns))
        .unwrap();
    server
        .add_variable(&ids::OBJECTS_FOLDER, name.clone(), NodeId::auto(ns), VariableAttributes::new(1))
        .unwrap();

    let result = server.translate_browse_path(&ids::OBJECTS_FOLDER, &[RelativePathElement::hierarchical(name)]);

    match result {
        Err(e @ Error::AddressSpace(AddressSpaceError::Ambiguous { candidates: 2, .. })) => {
            assert_eq!(e.status_code(), StatusCode::BAD_TOO_MANY_MATCHES)
        }
        other => panic!("expected Ambiguous, got {:?}", other),
    }
}

#[tokio::test]
async fn test_items_count_and_method_argument_check() {
    let server = create_server();
    let ns = server.add_namespace(TEST_NAMESPACE);
    let items = server
        .get_or_create_folder(&ids::OBJECTS_FOLDER, QualifiedName::new(ns, "Items"))
        .unwrap();
    let count = server
        .add_variable(&items, QualifiedName::new(ns, "Count"), NodeId::auto(ns), VariableAttributes::new(0))
        .unwrap();
    server.write_value(&count, 42).unwrap();
    assert_eq!(server.read_value(&count).unwrap(), Variant::from(42));

    let invoked = Arc::new(AtomicUsize::new(0));
    let seen = invoked.clone();
    let signature = MethodSignature::new(
        vec![Argument::new("A", ids::DOUBLE), Argument::new("B", ids::DOUBLE)],
        vec![Argument::new("Sum", ids::DOUBLE)],
    );
    let method = Arc::new(FnMethod::new("Add", signature, move |_server, _object, inputs| {
        seen.fetch_add(1, Ordering::SeqCst);
        let a: f64 = inputs[0].get()?;
        let b: f64 = inputs[1].get()?;
        Ok(vec![(a + b).into()])
    }));
    let method_id = server
        .add_method(&items, QualifiedName::new(ns, "Add"), NodeId::auto(ns), method.clone())
        .unwrap();

    match server.call(&method_id, &items, &[Variant::from(1.0f64)]) {
        Err(e @ Error::Method(MethodError::ArgumentCountMismatch { expected: 2, actual: 1, .. })) => {
            assert_eq!(e.status_code(), StatusCode::BAD_ARGUMENTS_MISSING)
        }
        other => panic!("expected ArgumentCountMismatch, got {:?}", other),
    }
    assert_eq!(invoked.load(Ordering::SeqCst), 0);

    let outputs = server
        .call(&method_id, &items, &[Variant::from(1.0f64), Variant::from(2.0f64)])
        .unwrap();
    assert_eq!(outputs, vec![Variant::from(3.0f64)]);
    assert_eq!(invoked.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_callback_follows_interval_change() {
    let server = create_server();
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();
    let callback = server
        .add_repeated_callback("Ticker", 2000, move |_cb| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();

    callback.start().unwrap();
    callback.change_interval(500).unwrap();
    tokio::time::sleep(Duration::from_millis(1600)).await;

    assert_eq!(callback.state(), CallbackState::Running);
    assert!(fired.load(Ordering::SeqCst) >= 3);

    assert!(callback.stop());
    let after_stop = fired.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(2000)).await;
    assert_eq!(fired.load(Ordering::SeqCst), after_stop);
}

#[tokio::test]
async fn test_host_routes_engine_requests() {
    let host = start_host(Idle);
    let ns = host.server.add_namespace(TEST_NAMESPACE);
    let count = host
        .server
        .add_variable(
            &ids::OBJECTS_FOLDER,
            QualifiedName::new(ns, "Count"),
            NodeId::auto(ns),
            VariableAttributes::new(0),
        )
        .unwrap();

    let written = host
        .handle
        .request(
            RequestContext::local(),
            Request::Write {
                node_id: count.clone(),
                attribute: AttributeId::Value,
                value: Variant::from(42),
            },
        )
        .await
        .unwrap();
    assert_eq!(written, Response::Written);

    let read = host
        .handle
        .request(
            RequestContext::local(),
            Request::Read {
                node_id: count.clone(),
                attribute: AttributeId::Value,
            },
        )
        .await
        .unwrap();
    assert_eq!(read, Response::Value(Variant::from(42)));

    host.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_remote_delete_is_denied_by_default() {
    let host = start_host(Idle);
    let ns = host.server.add_namespace(TEST_NAMESPACE);
    let folder = host
        .server
        .add_folder(&ids::OBJECTS_FOLDER, QualifiedName::new(ns, "Kept"), NodeId::auto(ns))
        .unwrap();
    let remote = RequestContext::remote(NodeId::string(1, "session-1"));

    let denied = host
        .handle
        .request(
            remote.clone(),
            Request::DeleteNode {
                node_id: folder.clone(),
                cascade: true,
            },
        )
        .await;
    match denied {
        Err(e @ Error::AddressSpace(AddressSpaceError::AccessDenied { .. })) => {
            assert_eq!(e.status_code(), StatusCode::BAD_USER_ACCESS_DENIED)
        }
        other => panic!("expected AccessDenied, got {:?}", other),
    }
    assert!(host.server.node_exists(&folder));

    let deleted = host
        .handle
        .request(
            RequestContext::local(),
            Request::DeleteNode {
                node_id: folder.clone(),
                cascade: true,
            },
        )
        .await
        .unwrap();
    assert_eq!(deleted, Response::Deleted);
    assert!(!host.server.node_exists(&folder));

    host.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_request_after_shutdown_reports_engine_unavailable() {
    let host = start_host(Idle);
    let handle = host.handle.clone();
    host.shutdown().await.unwrap();

    let result = handle
        .request(
            RequestContext::local(),
            Request::Read {
                node_id: ids::OBJECTS_FOLDER,
                attribute: AttributeId::BrowseName,
            },
        )
        .await;

    assert!(matches!(result, Err(Error::EngineUnavailable(_))));
}
