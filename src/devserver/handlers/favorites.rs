use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde_json::json;

use super::{created, fail, not_found, ok};
use crate::devserver::auth::authenticate;
use crate::devserver::state::AppState;
use crate::models::{AddFavoriteRequest, Favorite};

pub async fn list_favorites(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let user = match authenticate(&req, &state) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let store = state.store();
    let favorites: Vec<Favorite> = store
        .favorites
        .iter()
        .filter(|f| f.user_id == user.id)
        .map(|f| Favorite {
            pet: store.pets.get(&f.pet_id).cloned(),
            ..f.clone()
        })
        .collect();
    ok(favorites)
}

pub async fn add_favorite(
    req: HttpRequest,
    data: web::Json<AddFavoriteRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let user = match authenticate(&req, &state) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let pet_id = data.pet_id;
    let mut store = state.store();
    if !store.pets.contains_key(&pet_id) {
        return not_found("Pet");
    }
    if store
        .favorites
        .iter()
        .any(|f| f.user_id == user.id && f.pet_id == pet_id)
    {
        return fail(409, "ALREADY_FAVORITED", "Pet is already in favorites");
    }

    let favorite = Favorite {
        id: store.next_id(),
        user_id: user.id,
        pet_id,
        pet: None,
        created_at: Some(Utc::now()),
    };
    store.favorites.push(favorite.clone());
    created(favorite)
}

pub async fn remove_favorite(
    req: HttpRequest,
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let user = match authenticate(&req, &state) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let pet_id = path.into_inner();
    let mut store = state.store();
    let before = store.favorites.len();
    store
        .favorites
        .retain(|f| !(f.user_id == user.id && f.pet_id == pet_id));
    if store.favorites.len() == before {
        return not_found("Favorite");
    }
    ok(json!({ "pet_id": pet_id }))
}
