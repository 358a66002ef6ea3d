use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use futures_util::TryStreamExt;
use serde_json::json;

use super::{created, fail, invalid, not_found, ok};
use crate::devserver::auth::authenticate;
use crate::devserver::state::{AppState, StoredImage};
use crate::models::{
    CreatePetRequest, Pet, PetImage, PetList, PetQuery, UpdatePetRequest, User, UserType,
};

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;

/// Offset and length of a 1-based page. Pages past the end yield an offset
/// beyond any list rather than overflowing.
fn page_window(page: u32, limit: u32) -> (usize, usize) {
    let offset = u64::from(page.max(1) - 1).saturating_mul(u64::from(limit));
    (usize::try_from(offset).unwrap_or(usize::MAX), limit as usize)
}

fn can_manage(user: &User, pet: &Pet) -> bool {
    pet.owner_id == user.id || user.user_type == UserType::Admin
}

fn matches_query(pet: &Pet, query: &PetQuery) -> bool {
    if let Some(search) = &query.search {
        let needle = search.to_lowercase();
        let hay = [
            Some(pet.name.as_str()),
            pet.breed.as_deref(),
            pet.description.as_deref(),
        ];
        if !hay
            .iter()
            .flatten()
            .any(|text| text.to_lowercase().contains(&needle))
        {
            return false;
        }
    }
    if matches!(&query.species, Some(s) if !s.eq_ignore_ascii_case(&pet.species)) {
        return false;
    }
    if let Some(breed) = &query.breed {
        if !pet
            .breed
            .as_deref()
            .is_some_and(|b| b.eq_ignore_ascii_case(breed))
        {
            return false;
        }
    }
    if query.gender.is_some_and(|g| g != pet.gender)
        || query.size.is_some_and(|s| s != pet.size)
        || query.status.is_some_and(|s| s != pet.status)
        || query.owner_id.is_some_and(|o| o != pet.owner_id)
    {
        return false;
    }
    if query.min_age_months.is_some() || query.max_age_months.is_some() {
        let Some(age) = pet.age_info.total_months() else {
            return false;
        };
        if query.min_age_months.is_some_and(|min| age < min)
            || query.max_age_months.is_some_and(|max| age > max)
        {
            return false;
        }
    }
    true
}

pub async fn list_pets(query: web::Query<PetQuery>, state: web::Data<AppState>) -> HttpResponse {
    let query = query.into_inner();
    if let Err(err) = query.validate() {
        return invalid(err);
    }
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    let (offset, len) = page_window(page, limit);

    let store = state.store();
    let matching: Vec<&Pet> = store
        .pets
        .values()
        .filter(|pet| matches_query(pet, &query))
        .collect();
    let total = matching.len() as u64;
    let pets = matching
        .into_iter()
        .skip(offset)
        .take(len)
        .cloned()
        .collect();

    ok(PetList {
        pets,
        total: Some(total),
        page: Some(page),
        limit: Some(limit),
    })
}

pub async fn get_pet(path: web::Path<i64>, state: web::Data<AppState>) -> HttpResponse {
    let store = state.store();
    match store.pets.get(&path.into_inner()) {
        Some(pet) => ok(pet),
        None => not_found("Pet"),
    }
}

pub async fn create_pet(
    req: HttpRequest,
    data: web::Json<CreatePetRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let user = match authenticate(&req, &state) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    if !user.user_type.can_list_pets() {
        return fail(403, "FORBIDDEN", "Only shelters and individuals can list pets");
    }
    let body = data.into_inner();
    if let Err(err) = body.validate() {
        return invalid(err);
    }

    let mut store = state.store();
    let id = store.next_id();
    let now = Utc::now();
    let pet = Pet {
        id,
        name: body.name,
        species: body.species,
        breed: body.breed,
        gender: body.gender,
        age_info: body.age_info,
        size: body.size,
        status: Default::default(),
        personality: body.personality,
        medical_info: body.medical_info,
        images: Vec::new(),
        description: body.description,
        location: body.location.or_else(|| user.location.clone()),
        owner_id: user.id,
        created_at: Some(now),
        updated_at: Some(now),
    };
    store.pets.insert(id, pet.clone());
    created(pet)
}

pub async fn update_pet(
    req: HttpRequest,
    path: web::Path<i64>,
    data: web::Json<UpdatePetRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let user = match authenticate(&req, &state) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let changes = data.into_inner();
    if let Err(err) = changes.validate() {
        return invalid(err);
    }

    let mut store = state.store();
    let Some(pet) = store.pets.get_mut(&path.into_inner()) else {
        return not_found("Pet");
    };
    if !can_manage(&user, pet) {
        return fail(403, "FORBIDDEN", "Not your listing");
    }

    if let Some(name) = changes.name {
        pet.name = name;
    }
    if changes.breed.is_some() {
        pet.breed = changes.breed;
    }
    if let Some(gender) = changes.gender {
        pet.gender = gender;
    }
    if let Some(age) = changes.age_info {
        pet.age_info = age;
    }
    if let Some(size) = changes.size {
        pet.size = size;
    }
    if let Some(status) = changes.status {
        pet.status = status;
    }
    if let Some(personality) = changes.personality {
        pet.personality = personality;
    }
    if let Some(medical) = changes.medical_info {
        pet.medical_info = medical;
    }
    if changes.description.is_some() {
        pet.description = changes.description;
    }
    if changes.location.is_some() {
        pet.location = changes.location;
    }
    pet.updated_at = Some(Utc::now());
    ok(pet.clone())
}

pub async fn delete_pet(
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
    match store.pets.get(&pet_id) {
        None => return not_found("Pet"),
        Some(pet) if !can_manage(&user, pet) => {
            return fail(403, "FORBIDDEN", "Not your listing")
        }
        Some(_) => {}
    }
    store.remove_pet(pet_id);
    ok(json!({ "deleted": pet_id }))
}

pub async fn list_images(path: web::Path<i64>, state: web::Data<AppState>) -> HttpResponse {
    let store = state.store();
    match store.pets.get(&path.into_inner()) {
        Some(pet) => ok(&pet.images),
        None => not_found("Pet"),
    }
}

pub async fn upload_image(
    req: HttpRequest,
    path: web::Path<i64>,
    mut payload: Multipart,
    state: web::Data<AppState>,
) -> HttpResponse {
    let user = match authenticate(&req, &state) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let pet_id = path.into_inner();
    match state.store().pets.get(&pet_id) {
        None => return not_found("Pet"),
        Some(pet) if !can_manage(&user, pet) => {
            return fail(403, "FORBIDDEN", "Not your listing")
        }
        Some(_) => {}
    }

    let mut is_primary = false;
    let mut image: Option<(String, String, Vec<u8>)> = None;

    while let Ok(Some(mut field)) = payload.try_next().await {
        let name = field.name().to_string();
        let mut data = Vec::new();
        while let Ok(Some(chunk)) = field.try_next().await {
            data.extend_from_slice(&chunk);
        }

        if name == "is_primary" {
            is_primary = String::from_utf8_lossy(&data).trim() == "true";
        } else if name == "image" {
            let filename = field
                .content_disposition()
                .get_filename()
                .unwrap_or("image.jpg")
                .to_string();
            let mime = field
                .content_type()
                .map(|m| m.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            image = Some((filename, mime, data));
        }
    }

    let Some((file_name, mime, bytes)) = image else {
        return fail(400, "VALIDATION_ERROR", "image field is required");
    };
    if bytes.is_empty() {
        return fail(400, "VALIDATION_ERROR", "image is empty");
    }

    let mut store = state.store();
    let image_id = store.next_id();
    store.images.insert(
        image_id,
        StoredImage {
            pet_id,
            file_name,
            mime,
            bytes,
        },
    );
    let Some(pet) = store.pets.get_mut(&pet_id) else {
        return not_found("Pet");
    };
    let is_primary = is_primary || pet.images.is_empty();
    if is_primary {
        pet.images.iter_mut().for_each(|img| img.is_primary = false);
    }
    let image = PetImage {
        id: image_id,
        url: format!("/uploads/{}", image_id),
        is_primary,
    };
    pet.images.push(image.clone());
    pet.updated_at = Some(Utc::now());
    created(image)
}

pub async fn delete_image(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let user = match authenticate(&req, &state) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let (pet_id, image_id) = path.into_inner();
    let mut store = state.store();
    let Some(pet) = store.pets.get_mut(&pet_id) else {
        return not_found("Pet");
    };
    if !can_manage(&user, pet) {
        return fail(403, "FORBIDDEN", "Not your listing");
    }
    let Some(pos) = pet.images.iter().position(|img| img.id == image_id) else {
        return not_found("Image");
    };
    let removed = pet.images.remove(pos);
    if removed.is_primary {
        if let Some(first) = pet.images.first_mut() {
            first.is_primary = true;
        }
    }
    store.images.remove(&image_id);
    ok(json!({ "deleted": image_id }))
}

pub async fn download_image(path: web::Path<i64>, state: web::Data<AppState>) -> HttpResponse {
    let store = state.store();
    match store.images.get(&path.into_inner()) {
        Some(image) => HttpResponse::Ok()
            .append_header(("Content-Type", image.mime.clone()))
            .append_header((
                "Content-Disposition",
                format!("inline; filename=\"{}\"", image.file_name),
            ))
            .body(image.bytes.clone()),
        None => HttpResponse::NotFound().finish(),
    }
}
