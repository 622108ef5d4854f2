#[allow(dead_code)]
mod common;

use common::{CHAT_HTML, HOME_HTML, TestServer, ws_connect, ws_login_and_ack};

fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn root_serves_home_page() {
    let server = TestServer::new().await;
    let resp = reqwest::get(server.base_url()).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), HOME_HTML);
}

#[tokio::test]
async fn create_redirects_to_fresh_room() {
    let server = TestServer::new().await;
    let client = no_redirect_client();

    let resp = client
        .get(format!("{}/create", server.base_url()))
        .send()
        .await
        .unwrap();

    assert!(resp.status().is_redirection(), "status: {}", resp.status());
    let location = resp.headers()["location"].to_str().unwrap();
    let id: u32 = location
        .strip_prefix("/chat/")
        .and_then(|id| id.parse().ok())
        .unwrap_or_else(|| panic!("Unexpected location: {location}"));
    assert!(id <= tandem_core::room::MAX_ROOM_ID);
}

#[tokio::test]
async fn create_followed_lands_on_chat_page() {
    let server = TestServer::new().await;
    let resp = reqwest::get(format!("{}/create", server.base_url()))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.url().path().starts_with("/chat/"));
    assert_eq!(resp.text().await.unwrap(), CHAT_HTML);
}

#[tokio::test]
async fn any_chat_path_serves_chat_page() {
    let server = TestServer::new().await;
    for id in ["1", "999999", "not-a-number"] {
        let resp = reqwest::get(format!("{}/chat/{id}", server.base_url()))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.text().await.unwrap(), CHAT_HTML);
    }
}

#[tokio::test]
async fn static_assets_are_served() {
    let server = TestServer::new().await;
    let resp = reqwest::get(format!("{}/app.js", server.base_url()))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.text().await.unwrap().contains("tandem"));
}

#[tokio::test]
async fn unknown_path_falls_back_to_home_page() {
    let server = TestServer::new().await;
    let resp = reqwest::get(format!("{}/nowhere/at/all", server.base_url()))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    assert_eq!(resp.text().await.unwrap(), HOME_HTML);
}

#[tokio::test]
async fn health_reports_rooms_and_connections() {
    let server = TestServer::new().await;
    let health_url = format!("{}/health", server.base_url());

    let body: serde_json::Value = reqwest::get(&health_url)
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["connections"]["websocket"], 0);
    assert_eq!(body["rooms"]["active"], 0);

    let mut ana = ws_connect(&server).await;
    ws_login_and_ack(&mut ana, "4", "ana", "f", "pt").await;
    let _lurker = ws_connect(&server).await;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let body: serde_json::Value = reqwest::get(&health_url)
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["connections"]["websocket"], 2);
    assert_eq!(body["connections"]["anonymous"], 1);
    assert_eq!(body["rooms"]["active"], 1);
    assert_eq!(body["rooms"]["occupants"], 1);
}
