#![cfg(test)]

use std::net::{SocketAddr, TcpListener};

use foundry_api::{Error as ApiError, ThreadId, Uuid, ViewerId};
use foundry_client::{ClientConfig, CommentService, HttpCommentService, SyncEngine};
use foundry_mock_server::MockServer;

use crate::{extractors::AppState, *};

fn spawn_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("binding test listener");
    let addr = listener.local_addr().expect("retrieving test listener address");
    let server = axum::Server::from_tcp(listener)
        .expect("building server from listener")
        .serve(app(AppState::new(MockServer::new())).into_make_service());
    tokio::spawn(async move {
        if let Err(err) = server.await {
            panic!("test server failed: {err}");
        }
    });
    addr
}

fn client(addr: SocketAddr, viewer: ViewerId) -> HttpCommentService {
    HttpCommentService::new(ClientConfig::new(format!("http://{addr}"), viewer))
        .expect("building http client")
}

#[tokio::test]
async fn engine_over_http() {
    let addr = spawn_server();
    let alice = ViewerId(Uuid::new_v4());
    let bob = ViewerId(Uuid::new_v4());
    let thread = ThreadId::new("problem-7");

    let engine = SyncEngine::open(client(addr, alice), thread.clone()).await;
    assert_eq!(engine.load_error(), None);
    assert!(engine.comments().is_empty());

    let root = engine
        .add_comment("first!", None)
        .await
        .expect("posting root");
    let reply = engine
        .add_comment("reply", Some(root.id))
        .await
        .expect("posting reply");
    let nested = engine
        .add_comment("reply to reply", Some(reply.id))
        .await
        .expect("posting nested reply");
    let comments = engine.comments();
    assert_eq!(comments.len(), 1);
    assert_eq!(
        comments[0]
            .replies
            .iter()
            .map(|c| c.id)
            .collect::<Vec<_>>(),
        vec![reply.id, nested.id]
    );

    let vote = engine.toggle_upvote(root.id).await.expect("upvoting");
    assert!(vote.has_upvoted);
    assert_eq!(vote.upvotes, 1);

    let edited = engine
        .edit_comment(reply.id, "edited")
        .await
        .expect("editing reply");
    assert_eq!(edited.content, "edited");
    engine.delete_comment(root.id).await.expect("deleting root");

    let other = SyncEngine::open(client(addr, bob), thread.clone()).await;
    let seen = other.comments();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].is_deleted);
    assert!(!seen[0].has_upvoted);
    assert_eq!(seen[0].upvotes, 1);
    assert_eq!(seen[0].replies[0].content, "edited");
    assert_eq!(seen[0].replies.len(), 2);

    // the local tree matches what a fresh load returns
    let fresh = SyncEngine::open(client(addr, alice), thread).await;
    assert_eq!(*engine.comments(), *fresh.comments());
}

#[tokio::test]
async fn rejections_come_back_typed() {
    let addr = spawn_server();
    let service = client(addr, ViewerId::stub());

    let err = service
        .fetch_thread(&ThreadId::new("not a thread"))
        .await
        .expect_err("bad thread id accepted");
    assert!(err.is_rejection());
    assert_eq!(
        err.api(),
        Some(&ApiError::InvalidThreadId(String::from("not a thread")))
    );

    let engine = SyncEngine::open(service, ThreadId::new("t")).await;
    let err = engine
        .add_comment(" ", None)
        .await
        .expect_err("empty comment accepted");
    assert_eq!(err.api(), Some(&ApiError::EmptyContent));
    assert!(engine.comments().is_empty());
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("binding test listener");
    let addr = listener.local_addr().expect("retrieving test listener address");
    drop(listener);

    let engine = SyncEngine::open(client(addr, ViewerId::stub()), ThreadId::new("t")).await;
    assert!(engine.load_error().is_some());
    let err = engine
        .add_comment("hello", None)
        .await
        .expect_err("posting to a closed port succeeded");
    assert!(!err.is_rejection());
    assert!(engine.comments().is_empty());
}
