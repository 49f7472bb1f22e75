use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{self, request},
};
use foundry_api::{Uuid, ViewerId};
use foundry_mock_server::MockServer;
use tokio::sync::Mutex;

use crate::Error;

#[derive(Clone)]
pub struct AppState {
    pub server: Arc<Mutex<MockServer>>,
}

impl AppState {
    pub fn new(server: MockServer) -> AppState {
        AppState {
            server: server.shared(),
        }
    }
}

/// Viewer named by the `Authorization: Bearer <uuid>` header. This identifies
/// who is looking, it does not authenticate them.
pub struct Viewer(pub ViewerId);

#[async_trait]
impl<S: Sync> FromRequestParts<S> for Viewer {
    type Rejection = Error;

    async fn from_request_parts(req: &mut request::Parts, _state: &S) -> Result<Viewer, Error> {
        match req.headers.get(http::header::AUTHORIZATION) {
            None => Err(Error::permission_denied()),
            Some(auth) => {
                let auth = auth.to_str().map_err(|_| Error::permission_denied())?;
                let mut auth = auth.split(' ');
                if !auth
                    .next()
                    .ok_or(Error::permission_denied())?
                    .eq_ignore_ascii_case("bearer")
                {
                    return Err(Error::permission_denied());
                }
                let viewer = auth.next().ok_or(Error::permission_denied())?;
                if auth.next().is_some() {
                    return Err(Error::permission_denied());
                }
                let viewer = Uuid::try_from(viewer).map_err(|_| Error::permission_denied())?;
                Ok(Viewer(ViewerId(viewer)))
            }
        }
    }
}
