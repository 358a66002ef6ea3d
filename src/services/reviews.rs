use crate::error::Result;
use crate::http::{ApiClient, ApiRequest};
use crate::models::{CreateReviewRequest, Review};

pub struct ReviewService<'a> {
    client: &'a ApiClient,
}

impl<'a> ReviewService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn for_target(&self, target_id: i64) -> Result<Vec<Review>> {
        self.client
            .execute(ApiRequest::get("/v1/reviews").param("target_id", target_id))
            .await
    }

    pub async fn create(&self, request: &CreateReviewRequest) -> Result<Review> {
        request.validate()?;
        self.client.post("/v1/reviews", request).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("/v1/reviews/{}", id)).await
    }
}
