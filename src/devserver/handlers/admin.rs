use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use super::{fail, not_found, ok};
use crate::devserver::auth::{authenticate, require_admin};
use crate::devserver::state::AppState;
use crate::models::{AdminStats, Pet, PetStatus, SetUserActiveRequest, User};

fn admin_guard(req: &HttpRequest, state: &AppState) -> Result<User, HttpResponse> {
    let user = authenticate(req, state)?;
    require_admin(&user)?;
    Ok(user)
}

pub async fn stats(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if let Err(resp) = admin_guard(&req, &state) {
        return resp;
    }
    let store = state.store();
    let count_status =
        |status: PetStatus| store.pets.values().filter(|p| p.status == status).count() as u64;
    let stats = AdminStats {
        total_users: store.users.len() as u64,
        total_pets: store.pets.len() as u64,
        available_pets: count_status(PetStatus::Available),
        adopted_pets: count_status(PetStatus::Adopted),
        open_inquiries: store
            .inquiries
            .values()
            .filter(|i| i.status.is_open())
            .count() as u64,
    };
    ok(stats)
}

pub async fn list_users(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if let Err(resp) = admin_guard(&req, &state) {
        return resp;
    }
    let store = state.store();
    let users: Vec<&User> = store.users.values().map(|u| &u.user).collect();
    ok(users)
}

pub async fn set_user_status(
    req: HttpRequest,
    path: web::Path<i64>,
    data: web::Json<SetUserActiveRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let admin = match admin_guard(&req, &state) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let user_id = path.into_inner();
    if user_id == admin.id && !data.is_active {
        return fail(400, "SELF_DEACTIVATION", "Admins cannot deactivate themselves");
    }
    let mut store = state.store();
    let Some(stored) = store.users.get_mut(&user_id) else {
        return not_found("User");
    };
    stored.user.is_active = data.is_active;
    let user = stored.user.clone();
    if !user.is_active {
        store.sessions.retain(|_, owner| *owner != user_id);
    }
    ok(user)
}

pub async fn delete_user(
    req: HttpRequest,
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let admin = match admin_guard(&req, &state) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let user_id = path.into_inner();
    if user_id == admin.id {
        return fail(400, "SELF_DELETE", "Admins cannot delete themselves");
    }
    let mut store = state.store();
    if store.users.remove(&user_id).is_none() {
        return not_found("User");
    }
    store.sessions.retain(|_, owner| *owner != user_id);
    store.favorites.retain(|f| f.user_id != user_id);
    store.notifications.retain(|_, n| n.user_id != user_id);
    let owned: Vec<i64> = store
        .pets
        .values()
        .filter(|p| p.owner_id == user_id)
        .map(|p| p.id)
        .collect();
    for pet_id in owned {
        store.remove_pet(pet_id);
    }
    ok(json!({ "deleted": user_id }))
}

pub async fn list_pets(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if let Err(resp) = admin_guard(&req, &state) {
        return resp;
    }
    let store = state.store();
    let pets: Vec<&Pet> = store.pets.values().collect();
    ok(pets)
}

pub async fn delete_pet(
    req: HttpRequest,
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> HttpResponse {
    if let Err(resp) = admin_guard(&req, &state) {
        return resp;
    }
    let pet_id = path.into_inner();
    let removed = state.store().remove_pet(pet_id);
    match removed {
        Some(_) => ok(json!({ "deleted": pet_id })),
        None => not_found("Pet"),
    }
}
