use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    routing::{get, post, put},
    Router,
};
use foundry_mock_server::MockServer;
use structopt::StructOpt;
use tower_http::trace::TraceLayer;

mod error;
mod extractors;
mod handlers;

mod e2e;
mod fuzz;

pub use error::Error;
use extractors::AppState;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "foundry-server",
    about = "Development comment service backed by an in-memory store"
)]
struct Opt {
    /// Address to listen on
    #[structopt(long, default_value = "127.0.0.1:3000")]
    listen: SocketAddr,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/threads/:thread/comments",
            get(handlers::fetch_thread).post(handlers::create_comment),
        )
        .route(
            "/api/comments/:comment",
            put(handlers::update_comment).delete(handlers::delete_comment),
        )
        .route("/api/comments/:comment/upvote", post(handlers::toggle_upvote))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let opt = Opt::from_args();

    let app = app(AppState::new(MockServer::new()));

    tracing::info!("listening on {}", opt.listen);
    axum::Server::bind(&opt.listen)
        .serve(app.into_make_service())
        .await
        .context("serving axum webserver")
}
