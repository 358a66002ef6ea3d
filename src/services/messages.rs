use crate::error::Result;
use crate::http::{ApiClient, ApiRequest};
use crate::models::{Message, SendMessageRequest};

pub struct MessageService<'a> {
    client: &'a ApiClient,
}

impl<'a> MessageService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn for_inquiry(&self, inquiry_id: i64) -> Result<Vec<Message>> {
        self.client
            .execute(ApiRequest::get("/v1/messages").param("inquiry_id", inquiry_id))
            .await
    }

    pub async fn send(&self, request: &SendMessageRequest) -> Result<Message> {
        request.validate()?;
        self.client.post("/v1/messages", request).await
    }

    pub async fn mark_read(&self, id: i64) -> Result<()> {
        self.client
            .execute_unit(ApiRequest::put(format!("/v1/messages/{}/read", id)))
            .await
    }
}
