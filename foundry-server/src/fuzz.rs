#![cfg(test)]

use std::{fmt::Debug, panic::AssertUnwindSafe};

use axum::{
    extract::FromRequestParts,
    http::{self, request},
    Router,
};
use foundry_api::{
    Comment, CommentEdit, CommentId, Error as ApiError, NewComment, Uuid, ViewerId, VoteStatus,
};
use foundry_mock_server::MockServer;
use tower::{Service, ServiceExt};

use crate::{extractors::*, *};

macro_rules! do_tokio_test {
    ( $name:ident, $typ:ty, $fn:expr ) => {
        #[test]
        fn $name() {
            let runtime = AssertUnwindSafe(
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("failed initializing tokio runtime"),
            );
            bolero::check!()
                .with_type::<$typ>()
                .cloned()
                .for_each(move |v| {
                    let () = runtime.block_on($fn(v));
                })
        }
    };
}

do_tokio_test!(fuzz_viewer_extractor, String, |token| async move {
    if let Ok(req) = http::Request::builder()
        .method(http::Method::GET)
        .uri("/")
        .header(http::header::AUTHORIZATION, token)
        .body(())
    {
        let mut req = req.into_parts().0;
        let res = Viewer::from_request_parts(&mut req, &()).await;
        match res {
            Ok(_) => (),
            Err(Error::Api(ApiError::PermissionDenied)) => (),
            Err(e) => panic!("got unexpected error: {e}"),
        }
    }
});

async fn call<Resp>(
    app: &mut Router,
    req: request::Request<axum::body::Body>,
) -> Result<Resp, ApiError>
where
    Resp: 'static + for<'de> serde::Deserialize<'de>,
{
    app.ready().await.expect("waiting for app to be ready");
    let resp = app.call(req).await.expect("running request");
    let status = resp.status();
    let body = hyper::body::to_bytes(resp.into_body())
        .await
        .expect("recovering resp bytes");
    if status == http::StatusCode::OK {
        if std::any::TypeId::of::<Resp>() == std::any::TypeId::of::<()>() {
            // the server answers with an empty body here, which serde_json does not parse
            return Ok(serde_json::from_slice(b"null").unwrap());
        }
        return Ok(serde_json::from_slice(&body)
            .unwrap_or_else(|err| panic!("failed parsing resp body {err}, body is {body:?}")));
    }
    let err = ApiError::parse(&body)
        .unwrap_or_else(|err| panic!("parsing error response body {err}, body is {body:?}"));
    assert_eq!(status, err.status_code(), "status code does not match {err}");
    Err(err)
}

async fn run_on_app<Req, Resp>(
    app: &mut Router,
    method: &str,
    uri: &str,
    viewer: Option<ViewerId>,
    body: Option<&Req>,
) -> Result<Resp, ApiError>
where
    Req: Debug + serde::Serialize,
    Resp: 'static + for<'de> serde::Deserialize<'de>,
{
    let req = request::Builder::new().method(method).uri(uri);
    let req = match viewer {
        Some(viewer) => req.header(http::header::AUTHORIZATION, format!("bearer {}", viewer.0)),
        None => req,
    };
    let req = match body {
        Some(body) => req
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(
                serde_json::to_vec(body).expect("serializing request body to json"),
            )),
        None => req.body(axum::body::Body::empty()),
    }
    .expect("building request");
    call(app, req).await
}

fn test_app() -> Router {
    app(AppState::new(MockServer::new()))
}

#[tokio::test]
async fn missing_viewer_is_rejected() {
    let mut app = test_app();
    let res: Result<Vec<Comment>, _> =
        run_on_app::<(), _>(&mut app, "GET", "/api/threads/t/comments", None, None).await;
    assert_eq!(res, Err(ApiError::PermissionDenied));

    let req = request::Builder::new()
        .method("GET")
        .uri("/api/threads/t/comments")
        .header(http::header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(axum::body::Body::empty())
        .expect("building request");
    let res: Result<Vec<Comment>, _> = call(&mut app, req).await;
    assert_eq!(res, Err(ApiError::PermissionDenied));
}

#[tokio::test]
async fn errors_keep_their_status() {
    let mut app = test_app();
    let viewer = Some(ViewerId::stub());

    let res: Result<Vec<Comment>, _> =
        run_on_app::<(), _>(&mut app, "GET", "/api/threads/a%20b/comments", viewer, None).await;
    assert_eq!(res, Err(ApiError::InvalidThreadId(String::from("a b"))));

    let res: Result<Comment, _> = run_on_app(
        &mut app,
        "POST",
        "/api/threads/t/comments",
        viewer,
        Some(&NewComment {
            content: String::from("   "),
            parent_id: None,
        }),
    )
    .await;
    assert_eq!(res, Err(ApiError::EmptyContent));

    let missing = CommentId(Uuid::new_v4());
    let res: Result<VoteStatus, _> = run_on_app::<(), _>(
        &mut app,
        "POST",
        &format!("/api/comments/{missing}/upvote"),
        viewer,
        None,
    )
    .await;
    assert_eq!(res, Err(ApiError::CommentNotFound(missing)));
}

#[tokio::test]
async fn routes_reach_the_store() {
    let mut app = test_app();
    let alice = Some(ViewerId(Uuid::new_v4()));
    let bob = Some(ViewerId(Uuid::new_v4()));

    let root: Comment = run_on_app(
        &mut app,
        "POST",
        "/api/threads/t/comments",
        alice,
        Some(&NewComment {
            content: String::from("hello"),
            parent_id: None,
        }),
    )
    .await
    .expect("creating root");
    let reply: Comment = run_on_app(
        &mut app,
        "POST",
        "/api/threads/t/comments",
        bob,
        Some(&NewComment {
            content: String::from("hi"),
            parent_id: Some(root.id),
        }),
    )
    .await
    .expect("creating reply");
    assert_eq!(reply.parent_id, Some(root.id));

    let vote: VoteStatus = run_on_app::<(), _>(
        &mut app,
        "POST",
        &format!("/api/comments/{}/upvote", root.id),
        bob,
        None,
    )
    .await
    .expect("upvoting");
    assert_eq!(
        vote,
        VoteStatus {
            has_upvoted: true,
            upvotes: 1
        }
    );

    let edited: Comment = run_on_app(
        &mut app,
        "PUT",
        &format!("/api/comments/{}", reply.id),
        bob,
        Some(&CommentEdit {
            content: String::from("hi there"),
        }),
    )
    .await
    .expect("editing reply");
    assert_eq!(edited.content, "hi there");

    let () = run_on_app::<(), _>(
        &mut app,
        "DELETE",
        &format!("/api/comments/{}", root.id),
        alice,
        None,
    )
    .await
    .expect("deleting root");

    let res: Result<Comment, _> = run_on_app(
        &mut app,
        "PUT",
        &format!("/api/comments/{}", root.id),
        alice,
        Some(&CommentEdit {
            content: String::from("back"),
        }),
    )
    .await;
    assert_eq!(res, Err(ApiError::CommentDeleted(root.id)));

    let thread: Vec<Comment> =
        run_on_app::<(), _>(&mut app, "GET", "/api/threads/t/comments", bob, None)
            .await
            .expect("fetching thread");
    assert_eq!(thread.len(), 1);
    assert!(thread[0].is_deleted);
    assert!(thread[0].has_upvoted);
    assert_eq!(thread[0].upvotes, 1);
    assert_eq!(thread[0].replies.len(), 1);
    assert_eq!(thread[0].replies[0].content, "hi there");

    let thread: Vec<Comment> =
        run_on_app::<(), _>(&mut app, "GET", "/api/threads/t/comments", alice, None)
            .await
            .expect("fetching thread");
    assert!(!thread[0].has_upvoted);
}
