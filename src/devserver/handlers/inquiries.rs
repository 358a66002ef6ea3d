use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;

use super::{created, fail, invalid, not_found, ok};
use crate::devserver::auth::authenticate;
use crate::devserver::state::AppState;
use crate::models::{
    CreateInquiryRequest, Inquiry, InquiryReply, InquiryReplyRequest, InquiryStatus,
    UpdateInquiryStatusRequest, User,
};

fn is_participant(user: &User, inquiry: &Inquiry) -> bool {
    inquiry.user_id == user.id || inquiry.owner_id == user.id
}

pub async fn list_sent(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let user = match authenticate(&req, &state) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let store = state.store();
    let sent: Vec<&Inquiry> = store
        .inquiries
        .values()
        .filter(|i| i.user_id == user.id)
        .collect();
    ok(sent)
}

pub async fn list_received(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let user = match authenticate(&req, &state) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let store = state.store();
    let received: Vec<&Inquiry> = store
        .inquiries
        .values()
        .filter(|i| i.owner_id == user.id)
        .collect();
    ok(received)
}

pub async fn get_inquiry(
    req: HttpRequest,
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let user = match authenticate(&req, &state) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let store = state.store();
    match store.inquiries.get(&path.into_inner()) {
        Some(inquiry) if is_participant(&user, inquiry) => ok(inquiry),
        Some(_) => fail(403, "FORBIDDEN", "Not part of this conversation"),
        None => not_found("Inquiry"),
    }
}

pub async fn create_inquiry(
    req: HttpRequest,
    data: web::Json<CreateInquiryRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let user = match authenticate(&req, &state) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let body = data.into_inner();
    if let Err(err) = body.validate() {
        return invalid(err);
    }

    let mut store = state.store();
    let Some(pet) = store.pets.get(&body.pet_id) else {
        return not_found("Pet");
    };
    if pet.owner_id == user.id {
        return fail(400, "OWN_PET", "Cannot send an inquiry about your own pet");
    }
    let (owner_id, pet_name) = (pet.owner_id, pet.name.clone());

    let id = store.next_id();
    let now = Utc::now();
    let inquiry = Inquiry {
        id,
        pet_id: body.pet_id,
        user_id: user.id,
        owner_id,
        message: body.message,
        status: InquiryStatus::Pending,
        replies: Vec::new(),
        pet_name: Some(pet_name.clone()),
        created_at: Some(now),
        updated_at: Some(now),
    };
    store.inquiries.insert(id, inquiry.clone());
    store.notify(
        owner_id,
        "inquiry_received",
        format!("New inquiry about {}", pet_name),
        Some(id),
    );
    created(inquiry)
}

pub async fn update_status(
    req: HttpRequest,
    path: web::Path<i64>,
    data: web::Json<UpdateInquiryStatusRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let user = match authenticate(&req, &state) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let id = path.into_inner();
    let mut store = state.store();
    let Some(inquiry) = store.inquiries.get_mut(&id) else {
        return not_found("Inquiry");
    };
    if inquiry.owner_id != user.id {
        return fail(403, "FORBIDDEN", "Only the pet owner can change the status");
    }
    inquiry.status = data.status;
    inquiry.updated_at = Some(Utc::now());
    let updated = inquiry.clone();

    store.notify(
        updated.user_id,
        "inquiry_status",
        format!(
            "Your inquiry about {} changed",
            updated.pet_name.as_deref().unwrap_or("a pet")
        ),
        Some(id),
    );
    ok(updated)
}

pub async fn reply(
    req: HttpRequest,
    path: web::Path<i64>,
    data: web::Json<InquiryReplyRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let user = match authenticate(&req, &state) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let body = data.into_inner();
    if let Err(err) = body.validate() {
        return invalid(err);
    }

    let id = path.into_inner();
    let mut store = state.store();
    let reply_id = store.next_id();
    let Some(inquiry) = store.inquiries.get_mut(&id) else {
        return not_found("Inquiry");
    };
    if !is_participant(&user, inquiry) {
        return fail(403, "FORBIDDEN", "Not part of this conversation");
    }
    if !inquiry.status.is_open() {
        return fail(409, "INQUIRY_CLOSED", "Inquiry is no longer open");
    }

    let now = Utc::now();
    inquiry.replies.push(InquiryReply {
        id: reply_id,
        sender_id: user.id,
        message: body.message,
        created_at: Some(now),
    });
    if user.id == inquiry.owner_id && inquiry.status == InquiryStatus::Pending {
        inquiry.status = InquiryStatus::Responded;
    }
    inquiry.updated_at = Some(now);
    let updated = inquiry.clone();

    let recipient = if user.id == updated.owner_id {
        updated.user_id
    } else {
        updated.owner_id
    };
    store.notify(recipient, "inquiry_reply", format!("New reply from {}", user.name), Some(id));
    ok(updated)
}
