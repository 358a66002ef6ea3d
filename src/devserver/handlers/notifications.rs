use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use super::{not_found, ok};
use crate::devserver::auth::authenticate;
use crate::devserver::state::AppState;
use crate::models::{Notification, UnreadCount};

pub async fn list_notifications(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let user = match authenticate(&req, &state) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let store = state.store();
    // newest first
    let list: Vec<&Notification> = store
        .notifications
        .values()
        .rev()
        .filter(|n| n.user_id == user.id)
        .collect();
    ok(list)
}

pub async fn unread_count(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let user = match authenticate(&req, &state) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let count = state
        .store()
        .notifications
        .values()
        .filter(|n| n.user_id == user.id && !n.read)
        .count() as u64;
    ok(UnreadCount { count })
}

pub async fn mark_read(
    req: HttpRequest,
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let user = match authenticate(&req, &state) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let id = path.into_inner();
    let mut store = state.store();
    match store.notifications.get_mut(&id) {
        Some(n) if n.user_id == user.id => {
            n.read = true;
            ok(json!({ "id": id }))
        }
        _ => not_found("Notification"),
    }
}

pub async fn mark_all_read(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let user = match authenticate(&req, &state) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let mut updated = 0u64;
    for n in state.store().notifications.values_mut() {
        if n.user_id == user.id && !n.read {
            n.read = true;
            updated += 1;
        }
    }
    ok(json!({ "updated": updated }))
}

pub async fn delete_notification(
    req: HttpRequest,
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let user = match authenticate(&req, &state) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let id = path.into_inner();
    let mut store = state.store();
    match store.notifications.get(&id) {
        Some(n) if n.user_id == user.id => {
            store.notifications.remove(&id);
            ok(json!({ "deleted": id }))
        }
        _ => not_found("Notification"),
    }
}
