use std::path::{Path, PathBuf};

use axum::response::Redirect;

use tandem_core::room::generate_room_id;

/// `GET /create`: send the visitor to a fresh random room.
pub async fn create_room() -> Redirect {
    let id = generate_room_id();
    tracing::debug!(room = %id, "Generated room id");
    Redirect::to(&format!("/chat/{id}"))
}

/// Page served unchanged for every `/chat/{id}`; the client reads the id
/// from its own URL.
pub fn chat_page(web_root: &str) -> PathBuf {
    Path::new(web_root).join("chat.html")
}

/// Landing page served for `/`.
pub fn home_page(web_root: &str) -> PathBuf {
    Path::new(web_root).join("home.html")
}
