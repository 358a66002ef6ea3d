use crate::error::Result;
use crate::http::{ApiClient, ApiRequest};
use crate::models::{Notification, UnreadCount};

pub struct NotificationService<'a> {
    client: &'a ApiClient,
}

impl<'a> NotificationService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Notification>> {
        self.client.get("/v1/notifications").await
    }

    pub async fn unread_count(&self) -> Result<u64> {
        let count: UnreadCount = self.client.get("/v1/notifications/unread-count").await?;
        Ok(count.count)
    }

    pub async fn mark_read(&self, id: i64) -> Result<()> {
        self.client
            .execute_unit(ApiRequest::put(format!("/v1/notifications/{}/read", id)))
            .await
    }

    pub async fn mark_all_read(&self) -> Result<()> {
        self.client
            .execute_unit(ApiRequest::put("/v1/notifications/read-all"))
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client
            .delete(&format!("/v1/notifications/{}", id))
            .await
    }
}
