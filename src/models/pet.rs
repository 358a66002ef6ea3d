use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PetGender {
    Male,
    Female,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PetSize {
    Small,
    #[default]
    Medium,
    Large,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
    #[default]
    Available,
    Pending,
    Adopted,
}

impl PetStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PetStatus::Available => "available",
            PetStatus::Pending => "pending",
            PetStatus::Adopted => "adopted",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeInfo {
    #[serde(default)]
    pub years: Option<u32>,
    #[serde(default)]
    pub months: Option<u32>,
    /// Free-form age such as "about 2 years" when the exact age is unknown.
    #[serde(default)]
    pub text: Option<String>,
}

impl AgeInfo {
    pub fn total_months(&self) -> Option<u32> {
        match (self.years, self.months) {
            (None, None) => None,
            (years, months) => Some(years.unwrap_or(0) * 12 + months.unwrap_or(0)),
        }
    }

    pub fn display(&self) -> String {
        match (self.years, self.months) {
            (Some(y), Some(m)) if y > 0 && m > 0 => format!("{}y {}m", y, m),
            (Some(y), _) if y > 0 => format!("{}y", y),
            (_, Some(m)) => format!("{}m", m),
            _ => self.text.clone().unwrap_or_else(|| "unknown".to_string()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(months) = self.months {
            if months > 11 {
                return Err(ApiError::Validation(format!(
                    "age months must be between 0 and 11, got {}",
                    months
                )));
            }
        }
        if matches!(self.years, Some(y) if y > 40) {
            return Err(ApiError::Validation("age years looks wrong for a cat".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalInfo {
    #[serde(default)]
    pub vaccinated: bool,
    #[serde(default)]
    pub neutered: bool,
    #[serde(default)]
    pub microchipped: bool,
    #[serde(default)]
    pub special_needs: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetImage {
    pub id: i64,
    pub url: String,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: i64,
    pub name: String,
    #[serde(default = "default_species")]
    pub species: String,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub gender: PetGender,
    #[serde(default)]
    pub age_info: AgeInfo,
    #[serde(default)]
    pub size: PetSize,
    #[serde(default)]
    pub status: PetStatus,
    #[serde(default)]
    pub personality: Vec<String>,
    #[serde(default)]
    pub medical_info: MedicalInfo,
    #[serde(default)]
    pub images: Vec<PetImage>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub owner_id: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_species() -> String {
    "cat".to_string()
}

impl Pet {
    pub fn primary_image(&self) -> Option<&PetImage> {
        self.images
            .iter()
            .find(|img| img.is_primary)
            .or_else(|| self.images.first())
    }

    pub fn is_available(&self) -> bool {
        self.status == PetStatus::Available
    }
}

/// `GET /pets` answer. Older deployments call the list `items`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PetList {
    #[serde(alias = "items")]
    pub pets: Vec<Pet>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl PetList {
    pub fn has_more(&self) -> bool {
        match (self.total, self.page, self.limit) {
            (Some(total), Some(page), Some(limit)) => (page as u64) * (limit as u64) < total,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PetQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<PetGender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<PetSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PetStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_age_months: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age_months: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl PetQuery {
    pub fn page(mut self, page: u32, limit: u32) -> Self {
        self.page = Some(page);
        self.limit = Some(limit);
        self
    }

    pub fn status(mut self, status: PetStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn owner(mut self, owner_id: i64) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.min_age_months, self.max_age_months) {
            if min > max {
                return Err(ApiError::Validation(format!(
                    "min_age_months ({}) is greater than max_age_months ({})",
                    min, max
                )));
            }
        }
        if self.limit == Some(0) {
            return Err(ApiError::Validation("limit must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatePetRequest {
    pub name: String,
    #[serde(default = "default_species")]
    pub species: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub gender: PetGender,
    #[serde(default)]
    pub age_info: AgeInfo,
    #[serde(default)]
    pub size: PetSize,
    #[serde(default)]
    pub personality: Vec<String>,
    #[serde(default)]
    pub medical_info: MedicalInfo,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub location: Option<String>,
}

impl CreatePetRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            species: default_species(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation("pet name is required".into()));
        }
        if self.species.trim().is_empty() {
            return Err(ApiError::Validation("species is required".into()));
        }
        self.age_info.validate()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdatePetRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<PetGender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_info: Option<AgeInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<PetSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PetStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personality: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_info: Option<MedicalInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl UpdatePetRequest {
    pub fn validate(&self) -> Result<()> {
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err(ApiError::Validation("pet name cannot be blank".into()));
        }
        match &self.age_info {
            Some(age) => age.validate(),
            None => Ok(()),
        }
    }
}

/// An image queued for `POST /pets/{id}/images`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
    pub is_primary: bool,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
            is_primary: false,
        }
    }

    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_pet_json_gets_defaults() {
        let pet: Pet = serde_json::from_str(
            r#"{"id":11,"name":"Miso","owner_id":2,"gender":"female","size":"tiny","status":"pending"}"#,
        )
        .unwrap();
        assert_eq!(pet.species, "cat");
        assert_eq!(pet.gender, PetGender::Female);
        assert_eq!(pet.size, PetSize::Unknown);
        assert_eq!(pet.status, PetStatus::Pending);
        assert!(pet.personality.is_empty());
        assert!(pet.primary_image().is_none());
        assert!(!pet.is_available());
    }

    #[test]
    fn age_display_and_validation() {
        let age = AgeInfo { years: Some(2), months: Some(3), text: None };
        assert_eq!(age.display(), "2y 3m");
        assert_eq!(age.total_months(), Some(27));

        let kitten = AgeInfo { years: None, months: Some(4), text: None };
        assert_eq!(kitten.display(), "4m");

        let vague = AgeInfo { text: Some("senior".into()), ..Default::default() };
        assert_eq!(vague.display(), "senior");
        assert_eq!(vague.total_months(), None);

        let bad = AgeInfo { years: Some(1), months: Some(14), text: None };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn pet_list_accepts_items_alias() {
        let list: PetList = serde_json::from_str(
            r#"{"items":[{"id":1,"name":"A","owner_id":1}],"total":30,"page":1,"limit":20}"#,
        )
        .unwrap();
        assert_eq!(list.pets.len(), 1);
        assert!(list.has_more());
    }

    #[test]
    fn query_validation() {
        let query = PetQuery {
            min_age_months: Some(24),
            max_age_months: Some(12),
            ..Default::default()
        };
        assert!(query.validate().is_err());
        assert!(PetQuery::default().page(1, 20).validate().is_ok());
    }
}
