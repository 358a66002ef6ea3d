use crate::error::Result;
use crate::http::ApiClient;
use crate::models::{
    CreateInquiryRequest, Inquiry, InquiryReplyRequest, InquiryStatus, UpdateInquiryStatusRequest,
};

pub struct InquiryService<'a> {
    client: &'a ApiClient,
}

impl<'a> InquiryService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Inquiries the current user opened as an adopter.
    pub async fn sent(&self) -> Result<Vec<Inquiry>> {
        self.client.get("/v1/inquiries").await
    }

    /// Inquiries about pets the current user lists.
    pub async fn received(&self) -> Result<Vec<Inquiry>> {
        self.client.get("/v1/inquiries/received").await
    }

    pub async fn get(&self, id: i64) -> Result<Inquiry> {
        self.client.get(&format!("/v1/inquiries/{}", id)).await
    }

    pub async fn create(&self, request: &CreateInquiryRequest) -> Result<Inquiry> {
        request.validate()?;
        self.client.post("/v1/inquiries", request).await
    }

    pub async fn update_status(&self, id: i64, status: InquiryStatus) -> Result<Inquiry> {
        self.client
            .put(
                &format!("/v1/inquiries/{}/status", id),
                &UpdateInquiryStatusRequest { status },
            )
            .await
    }

    pub async fn reply(&self, id: i64, message: impl Into<String>) -> Result<Inquiry> {
        let request = InquiryReplyRequest {
            message: message.into(),
        };
        request.validate()?;
        self.client
            .post(&format!("/v1/inquiries/{}/reply", id), &request)
            .await
    }
}
