use crate::error::Result;
use crate::http::ApiClient;
use crate::models::{
    Application, ApplicationStatus, SubmitApplicationRequest, UpdateApplicationStatusRequest,
};

pub struct ApplicationService<'a> {
    client: &'a ApiClient,
}

impl<'a> ApplicationService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn mine(&self) -> Result<Vec<Application>> {
        self.client.get("/v1/applications").await
    }

    pub async fn received(&self) -> Result<Vec<Application>> {
        self.client.get("/v1/applications/received").await
    }

    pub async fn get(&self, id: i64) -> Result<Application> {
        self.client.get(&format!("/v1/applications/{}", id)).await
    }

    pub async fn submit(&self, request: &SubmitApplicationRequest) -> Result<Application> {
        self.client.post("/v1/applications", request).await
    }

    pub async fn update_status(&self, id: i64, status: ApplicationStatus) -> Result<Application> {
        self.client
            .put(
                &format!("/v1/applications/{}/status", id),
                &UpdateApplicationStatusRequest { status },
            )
            .await
    }

    pub async fn withdraw(&self, id: i64) -> Result<Application> {
        self.update_status(id, ApplicationStatus::Withdrawn).await
    }
}
