use super::*;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use shared::{
    domain::{Item, ItemId},
    error::ApiError,
    protocol::{TodoRequest, ADD_PATH, DELETE_PATH, EDIT_PATH, LIST_PATH},
};
use tokio::{net::TcpListener, sync::Mutex};

type Reply = (StatusCode, Json<Value>);

#[derive(Clone, Default)]
struct MemoryStore {
    items: Arc<Mutex<Vec<Item>>>,
}

fn reject(status: StatusCode, reason: &str) -> Reply {
    (status, Json(json!(ApiError::new(reason))))
}

async fn list(State(store): State<MemoryStore>) -> Reply {
    let items = store.items.lock().await.clone();
    (StatusCode::OK, Json(json!(items)))
}

async fn add(State(store): State<MemoryStore>, Json(body): Json<TodoRequest>) -> Reply {
    if body.todo.desc.contains("forbidden") {
        return reject(StatusCode::UNPROCESSABLE_ENTITY, "description not allowed");
    }
    let mut items = store.items.lock().await;
    if items.iter().any(|item| item.uid == body.todo.uid) {
        return reject(StatusCode::CONFLICT, "duplicate uid");
    }
    items.push(body.todo.clone());
    (StatusCode::OK, Json(json!(body.todo)))
}

async fn remove(State(store): State<MemoryStore>, Path(uid): Path<String>) -> Reply {
    let mut items = store.items.lock().await;
    let before = items.len();
    items.retain(|item| item.uid.as_str() != uid);
    if items.len() == before {
        return reject(StatusCode::NOT_FOUND, "no such item");
    }
    (StatusCode::OK, Json(json!(true)))
}

async fn edit(State(store): State<MemoryStore>, Json(body): Json<TodoRequest>) -> Reply {
    let mut items = store.items.lock().await;
    match items.iter_mut().find(|item| item.uid == body.todo.uid) {
        Some(slot) => {
            *slot = body.todo;
            (StatusCode::OK, Json(json!({ "acknowledged": true })))
        }
        None => reject(StatusCode::NOT_FOUND, "no such item"),
    }
}

async fn spawn_memory_store(seed: Vec<Item>) -> Result<(StoreSettings, MemoryStore)> {
    let store = MemoryStore {
        items: Arc::new(Mutex::new(seed)),
    };
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let app = Router::new()
        .route(LIST_PATH, post(list))
        .route(ADD_PATH, post(add))
        .route(&format!("{DELETE_PATH}/:uid"), delete(remove))
        .route(EDIT_PATH, put(edit))
        .with_state(store.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let settings = StoreSettings {
        server_url: "http://127.0.0.1".into(),
        port: Some(addr.port()),
        ..StoreSettings::default()
    };
    Ok((settings, store))
}

#[tokio::test]
async fn controller_round_trips_through_http_store() {
    let (settings, remote) = spawn_memory_store(vec![Item::new("1", "buy milk", false)])
        .await
        .expect("spawn store");
    let controller = ListController::new(Arc::new(HttpItemStore::new(&settings).expect("client")));

    controller.load().await.expect("load");
    assert_eq!(controller.items().await, vec![Item::new("1", "buy milk", false)]);

    let added = controller.add("walk dog").await.expect("add");
    controller
        .toggle_done(&ItemId::from("1"))
        .await
        .expect("toggle");
    controller
        .commit_edit(&added.uid, "walk the dog")
        .await
        .expect("edit");

    let local = controller.items().await;
    assert_eq!(
        local,
        vec![
            Item::new(added.uid.clone(), "walk the dog", false),
            Item::new("1", "buy milk", true),
        ]
    );
    let mut remote_items = remote.items.lock().await.clone();
    remote_items.sort_by(|a, b| a.uid.cmp(&b.uid));
    let mut expected = local.clone();
    expected.sort_by(|a, b| a.uid.cmp(&b.uid));
    assert_eq!(remote_items, expected);

    controller
        .remove(&ItemId::from("1"))
        .await
        .expect("remove");
    assert_eq!(controller.items().await.len(), 1);
    assert_eq!(remote.items.lock().await.len(), 1);

    let view = controller.view().await;
    assert_eq!(view.todo.len(), 1);
    assert!(view.done.is_empty());
    assert_eq!(
        view.notification.map(|note| note.message),
        Some("Removed \"buy milk\"".to_string())
    );
}

#[tokio::test]
async fn store_rejection_reason_reaches_the_view() {
    let (settings, remote) = spawn_memory_store(Vec::new())
        .await
        .expect("spawn store");
    let controller = ListController::new(Arc::new(HttpItemStore::new(&settings).expect("client")));
    controller.load().await.expect("load");

    let err = controller
        .add("something forbidden")
        .await
        .expect_err("must be rejected");

    assert!(matches!(
        err,
        ControllerError::Store(StoreError::Rejected {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            ..
        })
    ));
    assert!(controller.items().await.is_empty());
    assert!(remote.items.lock().await.is_empty());
    let view = controller.view().await;
    let note = view.notification.expect("notification");
    assert_eq!(note.kind, NotificationKind::Error);
    assert_eq!(note.message, "Error: description not allowed");
}

#[tokio::test]
async fn item_removed_elsewhere_fails_without_local_change() {
    let seed = vec![Item::new("1", "buy milk", false), Item::new("2", "walk dog", false)];
    let (settings, remote) = spawn_memory_store(seed.clone())
        .await
        .expect("spawn store");
    let controller = ListController::new(Arc::new(HttpItemStore::new(&settings).expect("client")));
    controller.load().await.expect("load");

    remote.items.lock().await.retain(|item| item.uid.as_str() != "2");

    controller
        .toggle_done(&ItemId::from("2"))
        .await
        .expect_err("must fail");
    assert_eq!(controller.items().await, seed);
    assert_eq!(
        controller.feedback().await.error_reason.as_deref(),
        Some("no such item")
    );
}
