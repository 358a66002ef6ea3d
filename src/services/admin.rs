use crate::error::Result;
use crate::http::ApiClient;
use crate::models::{AdminStats, Pet, SetUserActiveRequest, User};

pub struct AdminService<'a> {
    client: &'a ApiClient,
}

impl<'a> AdminService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn users(&self) -> Result<Vec<User>> {
        self.client.get("/admin/users").await
    }

    pub async fn set_user_active(&self, user_id: i64, is_active: bool) -> Result<User> {
        self.client
            .put(
                &format!("/admin/users/{}/status", user_id),
                &SetUserActiveRequest { is_active },
            )
            .await
    }

    pub async fn delete_user(&self, user_id: i64) -> Result<()> {
        self.client.delete(&format!("/admin/users/{}", user_id)).await
    }

    pub async fn pets(&self) -> Result<Vec<Pet>> {
        self.client.get("/admin/pets").await
    }

    pub async fn delete_pet(&self, pet_id: i64) -> Result<()> {
        self.client.delete(&format!("/admin/pets/{}", pet_id)).await
    }

    pub async fn stats(&self) -> Result<AdminStats> {
        self.client.get("/admin/stats").await
    }
}
