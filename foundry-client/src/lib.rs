mod engine;
pub use engine::SyncEngine;

mod error;
pub use error::Error;

mod http;
pub use http::{viewer_from_env, ClientConfig, HttpCommentService, HOST_ENV, VIEWER_ENV};

mod service;
pub use service::CommentService;

mod thread;
pub use thread::{transformed, ThreadStore};

mod views;
pub use views::ThreadViews;

pub mod api {
    pub use foundry_api::*;
}
