mod server_config;
mod error;
mod routes;
mod chat_socket;

use std::{path::{Path, PathBuf}, sync::{Arc, Mutex}};

use anyhow::Context;
use axum::{routing::{get, post, put}, Router};
use clap::Parser;
use log::{info, warn};
use tower_http::services::ServeDir;

use smokefree::{Dashboard, ChatRoom, SystemClock};
use smokefree::backend::JsonStore;

use server_config::AppConfig;
use routes::AppState;

const SERVER_CONFIG: &str = "resources/server.toml";

#[derive(Parser, Debug)]
#[clap(version, about)]
struct Args {
    /// Path to the server configuration file
    #[clap(short, long, value_parser, default_value = SERVER_CONFIG)]
    config: PathBuf
}

fn app(state: AppState, static_dir: &Path) -> Router {
    let api = Router::new()
        .route("/dashboard", get(routes::get_dashboard))
        .route("/records", post(routes::post_record))
        .route("/config/quit-date", put(routes::put_quit_date))
        .route("/config/price", put(routes::put_price))
        .route("/chat", get(routes::get_chat).post(routes::post_chat))
        .route("/chat/ws", get(chat_socket::chat_socket));

    Router::new()
        .nest("/api", api)
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
}

fn build_state(config: &AppConfig) -> AppState {
    let store = Arc::new(JsonStore::new(&config.storage.path));
    info!("using store {}", store.path().display());
    let mut dashboard = Dashboard::new(Arc::clone(&store), SystemClock)
        .with_currency(&config.display.currency);
    if let Some(notification) = dashboard.load() {
        warn!("initial load: {}", notification);
    }

    AppState {
        dashboard: Arc::new(Mutex::new(dashboard)),
        chat: Arc::new(ChatRoom::new(store))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = AppConfig::read_or_default(&args.config)?;

    let router = app(build_state(&config), &config.server.static_dir);
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;

    info!("listening on http://{}", address);
    axum::serve(listener, router).await
        .with_context(|| "server stopped unexpectedly")?;
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;

    use axum::{body::{to_bytes, Body}, http::{Request, StatusCode}};
    use rstest::{fixture, rstest};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        _workdir: TempDir
    }

    #[fixture]
    fn test_app() -> TestApp {
        let workdir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.storage.path = workdir.path().join("ledger.json");
        config.server.static_dir = workdir.path().join("static");

        let router = app(build_state(&config), &config.server.static_dir);
        TestApp { router, _workdir: workdir }
    }

    async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(body) => Body::from(body.to_string()),
                None => Body::empty()
            })
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[rstest]
    #[tokio::test]
    async fn fresh_dashboard(test_app: TestApp) {
        let (status, body) = call(&test_app.router, "GET", "/api/dashboard", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notification"], Value::Null);
        assert_eq!(body["view"]["streakDays"], json!(0));
        assert_eq!(body["view"]["price"], json!(600.0));
        assert_eq!(body["view"]["moneyDisplay"], json!("¥0"));
    }

    #[rstest]
    #[tokio::test]
    async fn marking_today_starts_streak(test_app: TestApp) {
        let (status, body) = call(&test_app.router, "POST", "/api/records", Some(json!({"smoked": false}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notification"], json!({"kind": "success", "message": "Recorded!"}));
        assert_eq!(body["view"]["streakDays"], json!(1));
        assert_eq!(body["view"]["moneyDisplay"], json!("¥600"));
        assert_eq!(body["view"]["todayRecord"], json!({"success": true}));
    }

    #[rstest]
    #[tokio::test]
    async fn price_accepts_numeric_text(test_app: TestApp) {
        let (status, body) = call(&test_app.router, "PUT", "/api/config/price", Some(json!({"price": "480"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"]["price"], json!(480.0));
    }

    #[rstest]
    #[tokio::test]
    async fn bad_quit_date_is_rejected(test_app: TestApp) {
        let (status, body) = call(&test_app.router, "PUT", "/api/config/quit-date", Some(json!({"quitDate": "someday"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], json!("error"));
        assert!(body["message"].as_str().unwrap().contains("someday"));

        let (status, body) = call(&test_app.router, "PUT", "/api/config/quit-date", Some(json!({"quitDate": "2999-01-01"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notification"]["kind"], json!("error"));
    }

    #[rstest]
    #[tokio::test]
    async fn chat_round_trip(test_app: TestApp) {
        let (_, body) = call(&test_app.router, "POST", "/api/chat", Some(json!({"text": "  "}))).await;
        assert_eq!(body["message"], Value::Null);

        let (_, body) = call(&test_app.router, "POST", "/api/chat", Some(json!({"text": "one week today"}))).await;
        assert_eq!(body["message"]["text"], json!("one week today"));

        let (status, body) = call(&test_app.router, "GET", "/api/chat", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }
}
