use crate::error::{ApiError, Result};
use crate::http::{ApiClient, ApiRequest, FilePart, MultipartBody};
use crate::models::{
    CreatePetRequest, ImageUpload, Pet, PetImage, PetList, PetQuery, UpdatePetRequest,
};

pub struct PetService<'a> {
    client: &'a ApiClient,
}

impl<'a> PetService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &PetQuery) -> Result<PetList> {
        query.validate()?;
        self.client
            .execute(ApiRequest::get("/pets").query(query)?)
            .await
    }

    /// Listings owned by the logged-in user.
    pub async fn mine(&self, query: PetQuery) -> Result<PetList> {
        let user = self
            .client
            .storage()
            .get_user()
            .await?
            .ok_or_else(|| ApiError::Validation("no logged-in user".into()))?;
        self.list(&query.owner(user.id)).await
    }

    pub async fn get(&self, id: i64) -> Result<Pet> {
        self.client.get(&format!("/pets/{}", id)).await
    }

    pub async fn create(&self, request: &CreatePetRequest) -> Result<Pet> {
        request.validate()?;
        self.client.post("/pets", request).await
    }

    pub async fn update(&self, id: i64, request: &UpdatePetRequest) -> Result<Pet> {
        request.validate()?;
        self.client.put(&format!("/pets/{}", id), request).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("/pets/{}", id)).await
    }

    pub async fn images(&self, pet_id: i64) -> Result<Vec<PetImage>> {
        self.client.get(&format!("/pets/{}/images", pet_id)).await
    }

    pub async fn upload_image(&self, pet_id: i64, upload: ImageUpload) -> Result<PetImage> {
        if upload.bytes.is_empty() {
            return Err(ApiError::Validation("image is empty".into()));
        }
        if !upload.mime.starts_with("image/") {
            return Err(ApiError::Validation(format!(
                "'{}' is not an image type",
                upload.mime
            )));
        }
        let body = MultipartBody::default()
            .text("is_primary", upload.is_primary.to_string())
            .file(FilePart {
                field: "image".to_string(),
                file_name: upload.file_name,
                mime: upload.mime,
                bytes: upload.bytes,
            });
        self.client
            .execute(ApiRequest::post(format!("/pets/{}/images", pet_id)).multipart(body))
            .await
    }

    pub async fn delete_image(&self, pet_id: i64, image_id: i64) -> Result<()> {
        self.client
            .delete(&format!("/pets/{}/images/{}", pet_id, image_id))
            .await
    }
}
