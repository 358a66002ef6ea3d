mod common;

use common::{client_for, register, start_devserver, PASSWORD};
use onlycats::devserver::DevSettings;
use onlycats::models::{
    AgeInfo, ChangePasswordRequest, CreateInquiryRequest, CreatePetRequest, ImageUpload,
    InquiryStatus, LoginRequest, PetQuery, PetStatus, RegisterRequest, UpdatePetRequest,
    UpdateProfileRequest, UserType,
};
use onlycats::{ApiError, FavoritesCache, SessionEvent};

fn tabby(name: &str) -> CreatePetRequest {
    CreatePetRequest {
        breed: Some("Tabby".into()),
        age_info: AgeInfo {
            years: Some(2),
            months: Some(3),
            text: None,
        },
        description: Some("Loves sunny windowsills".into()),
        ..CreatePetRequest::new(name)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shelter_lists_a_cat_and_adopter_inquires() {
    let server = start_devserver(DevSettings::default()).await;
    let shelter = client_for(&server.base_url());
    let adopter = client_for(&server.base_url());
    let shelter_user = register(&shelter, "paws@example.com", UserType::Shelter).await.user;
    register(&adopter, "sam@example.com", UserType::Adopter).await;

    // adopters cannot list pets
    let err = adopter.pets().create(&tabby("Nope")).await.unwrap_err();
    assert_eq!(err.status(), Some(403));

    let pet = shelter.pets().create(&tabby("Miso")).await.unwrap();
    assert_eq!(pet.owner_id, shelter_user.id);
    assert_eq!(pet.location.as_deref(), Some("Lisbon"));
    assert!(pet.is_available());
    shelter.pets().create(&tabby("Pickles")).await.unwrap();

    let first = shelter
        .pets()
        .upload_image(pet.id, ImageUpload::new("a.jpg", "image/jpeg", vec![1, 2, 3]))
        .await
        .unwrap();
    assert!(first.is_primary);
    let second = shelter
        .pets()
        .upload_image(pet.id, ImageUpload::new("b.jpg", "image/jpeg", vec![4, 5]).primary())
        .await
        .unwrap();
    let images = shelter.pets().images(pet.id).await.unwrap();
    assert_eq!(images.len(), 2);
    assert!(images.iter().all(|img| img.is_primary == (img.id == second.id)));

    shelter.pets().delete_image(pet.id, second.id).await.unwrap();
    let reloaded = adopter.pets().get(pet.id).await.unwrap();
    assert_eq!(reloaded.primary_image().map(|img| img.id), Some(first.id));

    let found = adopter
        .pets()
        .list(&PetQuery::default().search("miso"))
        .await
        .unwrap();
    assert_eq!(found.pets.len(), 1);
    assert_eq!(found.total, Some(1));
    let page = adopter
        .pets()
        .list(&PetQuery::default().page(2, 1))
        .await
        .unwrap();
    assert_eq!(page.pets.len(), 1);
    assert!(!page.has_more());
    let beyond = adopter
        .pets()
        .list(&PetQuery::default().page(300_000_000, 20))
        .await
        .unwrap();
    assert!(beyond.pets.is_empty());
    assert_eq!(beyond.total, Some(2));
    let capped = adopter
        .pets()
        .list(&PetQuery::default().page(1, 5_000))
        .await
        .unwrap();
    assert_eq!(capped.limit, Some(100));
    let mine = shelter.pets().mine(PetQuery::default()).await.unwrap();
    assert_eq!(mine.pets.len(), 2);

    let inquiry = adopter
        .inquiries()
        .create(&CreateInquiryRequest {
            pet_id: pet.id,
            message: "Is Miso good with dogs?".into(),
        })
        .await
        .unwrap();
    assert_eq!(inquiry.status, InquiryStatus::Pending);
    assert_eq!(inquiry.pet_name.as_deref(), Some("Miso"));
    assert_eq!(adopter.inquiries().sent().await.unwrap().len(), 1);
    assert!(adopter.inquiries().received().await.unwrap().is_empty());

    assert_eq!(shelter.notifications().unread_count().await.unwrap(), 1);
    let received = shelter.inquiries().received().await.unwrap();
    assert_eq!(received[0].id, inquiry.id);

    let replied = shelter
        .inquiries()
        .reply(inquiry.id, "Yes, she grew up with a beagle")
        .await
        .unwrap();
    assert_eq!(replied.status, InquiryStatus::Responded);
    assert_eq!(replied.replies.len(), 1);

    let accepted = shelter
        .inquiries()
        .update_status(inquiry.id, InquiryStatus::Accepted)
        .await
        .unwrap();
    assert_eq!(accepted.status, InquiryStatus::Accepted);

    // adopter only gets to change status through the owner
    let err = adopter
        .inquiries()
        .update_status(inquiry.id, InquiryStatus::Closed)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(403));

    let seen = adopter.inquiries().get(inquiry.id).await.unwrap();
    assert_eq!(seen.replies[0].message, "Yes, she grew up with a beagle");
    let notes = adopter.notifications().list().await.unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].kind, "inquiry_status");
    adopter.notifications().mark_read(notes[0].id).await.unwrap();
    assert_eq!(adopter.notifications().unread_count().await.unwrap(), 1);
    adopter.notifications().mark_all_read().await.unwrap();
    assert_eq!(adopter.notifications().unread_count().await.unwrap(), 0);

    let adopted = shelter
        .pets()
        .update(
            pet.id,
            &UpdatePetRequest {
                status: Some(PetStatus::Adopted),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(adopted.status, PetStatus::Adopted);
    let err = adopter
        .pets()
        .update(pet.id, &UpdatePetRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(403));

    shelter.pets().delete(pet.id).await.unwrap();
    assert!(adopter.pets().get(pet.id).await.unwrap_err().is_not_found());

    server.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn favorites_cache_toggles_and_rolls_back() {
    let server = start_devserver(DevSettings::default()).await;
    let shelter = client_for(&server.base_url());
    let adopter = client_for(&server.base_url());
    register(&shelter, "home@example.com", UserType::Individual).await;
    register(&adopter, "kim@example.com", UserType::Adopter).await;
    let pet = shelter.pets().create(&tabby("Biscuit")).await.unwrap();

    let cache = FavoritesCache::new(adopter.clone());
    cache.sync().await.unwrap();
    assert!(cache.pet_ids().is_empty());

    assert!(cache.toggle(pet.id).await.unwrap());
    assert!(cache.contains(pet.id));
    assert!(adopter.favorites().is_favorite(pet.id).await.unwrap());
    let listed = adopter.favorites().list().await.unwrap();
    assert_eq!(listed[0].pet.as_ref().map(|p| p.name.as_str()), Some("Biscuit"));

    // adding twice is a conflict on the server
    let err = adopter.favorites().add(pet.id).await.unwrap_err();
    assert_eq!(err.status(), Some(409));

    assert!(!cache.toggle(pet.id).await.unwrap());
    assert!(!cache.contains(pet.id));
    assert!(adopter.favorites().list().await.unwrap().is_empty());

    // the server rejects an unknown pet, local state must not keep the heart
    let err = cache.toggle(9_999).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(!cache.contains(9_999));

    server.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn profile_password_and_logout() {
    let server = start_devserver(DevSettings::default()).await;
    let client = client_for(&server.base_url());
    let mut events = client.subscribe();
    let user = register(&client, "noor@example.com", UserType::Adopter).await.user;
    assert_eq!(
        events.try_recv().unwrap(),
        SessionEvent::LoggedIn { user_id: user.id }
    );

    let updated = client
        .auth()
        .update_profile(&UpdateProfileRequest {
            bio: Some("Two cats, one sofa".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(updated.bio.as_deref(), Some("Two cats, one sofa"));
    let cached = client.auth().current_user().await.unwrap().unwrap();
    assert_eq!(cached.bio, updated.bio);

    let err = client
        .auth()
        .change_password(&ChangePasswordRequest {
            current_password: "wrong-password".into(),
            new_password: "tuna-and-rice".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
    client
        .auth()
        .change_password(&ChangePasswordRequest {
            current_password: PASSWORD.into(),
            new_password: "tuna-and-rice".into(),
        })
        .await
        .unwrap();

    client.auth().logout().await.unwrap();
    assert_eq!(events.try_recv().unwrap(), SessionEvent::LoggedOut);
    assert!(!client.auth().is_authenticated().await.unwrap());
    assert!(client.auth().current_user().await.unwrap().is_none());

    let err = client
        .auth()
        .login(&LoginRequest {
            email: "noor@example.com".into(),
            password: PASSWORD.into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
    let again = client
        .auth()
        .login(&LoginRequest {
            email: "noor@example.com".into(),
            password: "tuna-and-rice".into(),
        })
        .await
        .unwrap();
    assert_eq!(again.user.id, user.id);
    assert!(client.access_token_expiry().await.unwrap().is_some());

    server.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn admin_moderation() {
    let server = start_devserver(DevSettings::default()).await;
    server
        .seed_admin("root@example.com", PASSWORD, "Root")
        .unwrap();
    let admin = client_for(&server.base_url());
    admin
        .auth()
        .login(&LoginRequest {
            email: "root@example.com".into(),
            password: PASSWORD.into(),
        })
        .await
        .unwrap();

    let shelter = client_for(&server.base_url());
    let shelter_user = register(&shelter, "cats@example.com", UserType::Shelter).await.user;
    let pet = shelter.pets().create(&tabby("Nori")).await.unwrap();

    let err = shelter.admin().stats().await.unwrap_err();
    assert_eq!(err.status(), Some(403));

    let stats = admin.admin().stats().await.unwrap();
    assert_eq!(stats.total_users, 2);
    assert_eq!(stats.available_pets, 1);
    assert_eq!(admin.admin().users().await.unwrap().len(), 2);
    assert_eq!(admin.admin().pets().await.unwrap().len(), 1);

    let disabled = admin
        .admin()
        .set_user_active(shelter_user.id, false)
        .await
        .unwrap();
    assert!(!disabled.is_active);
    assert_eq!(shelter.pets().mine(PetQuery::default()).await.unwrap().pets.len(), 1);
    let err = shelter.auth().profile().await.unwrap_err();
    assert_eq!(err.status(), Some(403));

    admin.admin().delete_pet(pet.id).await.unwrap();
    admin.admin().delete_user(shelter_user.id).await.unwrap();
    assert_eq!(admin.admin().stats().await.unwrap().total_users, 1);
    let err = admin.admin().delete_user(shelter_user.id).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 404, .. }));

    server.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_share_one_account() {
    let server = start_devserver(DevSettings::default()).await;
    let clients: Vec<_> = (0..4).map(|_| client_for(&server.base_url())).collect();
    let request = |name: &str| RegisterRequest {
        email: "twin@example.com".into(),
        password: PASSWORD.into(),
        name: name.into(),
        user_type: UserType::Adopter,
        phone: None,
        location: None,
    };
    let (a, b, c, d) = (request("a"), request("b"), request("c"), request("d"));
    let (auth_a, auth_b, auth_c, auth_d) = (
        clients[0].auth(),
        clients[1].auth(),
        clients[2].auth(),
        clients[3].auth(),
    );

    let results = tokio::join!(
        auth_a.register(&a),
        auth_b.register(&b),
        auth_c.register(&c),
        auth_d.register(&d),
    );
    let results = [results.0, results.1, results.2, results.3];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.status(), Some(409));
    }
    server.stop().await;
}
