// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use coinsleuth::config::settings::DatabaseSettings;
use coinsleuth::infrastructure::database::connection;
use sea_orm::DatabaseConnection;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub const GENESIS: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";
pub const ETH_ADDRESS: &str = "0xde0B295669a9FD93d5F28D9Ec85E40f4cb697BAe";

/// 创建已迁移的内存 SQLite 数据库
pub async fn create_test_db() -> Arc<DatabaseConnection> {
    let settings = DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        max_connections: Some(1),
        min_connections: Some(1),
        connect_timeout: Some(5),
        idle_timeout: None,
    };

    Arc::new(
        connection::connect_and_migrate(&settings)
            .await
            .expect("Failed to set up test database"),
    )
}

/// 启动本地 HTTP 服务，返回其地址
///
/// `/donate` 页面包含重复的比特币地址和一个全零以太坊地址，`/empty` 不含地址，
/// `/broken` 始终返回 503。
pub async fn spawn_site() -> SocketAddr {
    let donate = format!(
        "<html><body><p>Donate: {g}</p><p>Mirror: {g}</p><code>0x{zeros}</code></body></html>",
        g = GENESIS,
        zeros = "0".repeat(40)
    );
    let wallets = format!(
        "<html><body><div class=\"wallet\">{}</div><input value=\"{}\"></body></html>",
        GENESIS, ETH_ADDRESS
    );

    let app = Router::new()
        .route(
            "/donate",
            get(move || {
                let body = donate.clone();
                async move { ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], body) }
            }),
        )
        .route(
            "/wallets",
            get(move || {
                let body = wallets.clone();
                async move { ([(header::CONTENT_TYPE, "text/html")], body) }
            }),
        )
        .route("/empty", get(|| async { "nothing to see here" }))
        .route(
            "/broken",
            get(|| async { axum::http::StatusCode::SERVICE_UNAVAILABLE.into_response() }),
        );

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no local address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    addr
}
