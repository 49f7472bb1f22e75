use axum::{
    extract::{Path, State},
    Json,
};
use foundry_api::{Comment, CommentEdit, CommentId, NewComment, ThreadId, Uuid, VoteStatus};

use crate::{extractors::*, Error};

pub async fn fetch_thread(
    Viewer(viewer): Viewer,
    State(state): State<AppState>,
    Path(thread): Path<String>,
) -> Result<Json<Vec<Comment>>, Error> {
    Ok(Json(
        state
            .server
            .lock()
            .await
            .fetch_thread(viewer, &ThreadId(thread))?,
    ))
}

pub async fn create_comment(
    Viewer(viewer): Viewer,
    State(state): State<AppState>,
    Path(thread): Path<String>,
    Json(data): Json<NewComment>,
) -> Result<Json<Comment>, Error> {
    Ok(Json(
        state
            .server
            .lock()
            .await
            .create_comment(viewer, &ThreadId(thread), data)?,
    ))
}

pub async fn update_comment(
    Viewer(viewer): Viewer,
    State(state): State<AppState>,
    Path(comment): Path<Uuid>,
    Json(data): Json<CommentEdit>,
) -> Result<Json<Comment>, Error> {
    Ok(Json(
        state
            .server
            .lock()
            .await
            .update_comment(viewer, CommentId(comment), data)?,
    ))
}

pub async fn delete_comment(
    Viewer(_viewer): Viewer,
    State(state): State<AppState>,
    Path(comment): Path<Uuid>,
) -> Result<(), Error> {
    state
        .server
        .lock()
        .await
        .delete_comment(CommentId(comment))?;
    Ok(())
}

pub async fn toggle_upvote(
    Viewer(viewer): Viewer,
    State(state): State<AppState>,
    Path(comment): Path<Uuid>,
) -> Result<Json<VoteStatus>, Error> {
    Ok(Json(
        state
            .server
            .lock()
            .await
            .toggle_upvote(viewer, CommentId(comment))?,
    ))
}
