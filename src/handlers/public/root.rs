// handlers/public/root.rs - GET / service index

use axum::response::Json;
use serde_json::{json, Value};

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Workspace Admin API",
            "version": version,
            "description": "Workspace administration with object-storage branding images",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "whoami": "/api/auth/whoami (session)",
                "picker": "/api/workspaces?q=&path= (session)",
                "workspace": "/api/w/:slug/settings, /api/workspaces/:id[/image] (workspace admin)",
                "admin": "/api/admin/workspaces[/:id[/image]] (superadmin)",
            }
        }
    }))
}
