use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, Result};

/// A request that can be sent more than once.
///
/// Bodies are kept as owned data instead of a `reqwest::RequestBuilder` so the
/// refresh path can replay the exact same call with a new bearer token.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Body,
    /// Public endpoints (login, register, refresh) never trigger a refresh.
    pub public: bool,
}

#[derive(Debug, Clone, Default)]
pub enum Body {
    #[default]
    Empty,
    Json(Value),
    Multipart(MultipartBody),
}

#[derive(Debug, Clone, Default)]
pub struct MultipartBody {
    pub fields: Vec<(String, String)>,
    pub files: Vec<FilePart>,
}

#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(mut self, part: FilePart) -> Self {
        self.files.push(part);
        self
    }

    /// Forms are single-use, so one is built for every attempt.
    pub(crate) fn to_form(&self) -> Result<Form> {
        let mut form = Form::new();
        for (name, value) in &self.fields {
            form = form.text(name.clone(), value.clone());
        }
        for file in &self.files {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .mime_str(&file.mime)?;
            form = form.part(file.field.clone(), part);
        }
        Ok(form)
    }
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: Body::Empty,
            public: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Body::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn multipart(mut self, body: MultipartBody) -> Self {
        self.body = Body::Multipart(body);
        self
    }

    /// Flattens a serializable struct into query pairs, skipping `None`s.
    pub fn query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Result<Self> {
        match serde_json::to_value(query)? {
            Value::Object(map) => {
                for (key, value) in map {
                    let value = match value {
                        Value::Null => continue,
                        Value::String(s) => s,
                        Value::Bool(b) => b.to_string(),
                        Value::Number(n) => n.to_string(),
                        other => other.to_string(),
                    };
                    self.query.push((key, value));
                }
                Ok(self)
            }
            Value::Null => Ok(self),
            other => Err(ApiError::Validation(format!(
                "query parameters must be an object, got {}",
                other
            ))),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PetGender, PetQuery, PetStatus};

    #[test]
    fn query_skips_unset_filters() {
        let query = PetQuery {
            gender: Some(PetGender::Female),
            status: Some(PetStatus::Available),
            ..Default::default()
        }
        .page(2, 10);

        let req = ApiRequest::get("/pets").query(&query).unwrap();
        let mut pairs = req.query.clone();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("gender".to_string(), "female".to_string()),
                ("limit".to_string(), "10".to_string()),
                ("page".to_string(), "2".to_string()),
                ("status".to_string(), "available".to_string()),
            ]
        );
    }

    #[test]
    fn scalar_query_is_rejected() {
        assert!(ApiRequest::get("/pets").query(&5).is_err());
    }

    #[test]
    fn multipart_builds_every_time() {
        let body = MultipartBody::default().text("is_primary", "true").file(FilePart {
            field: "image".into(),
            file_name: "miso.jpg".into(),
            mime: "image/jpeg".into(),
            bytes: vec![0xFF, 0xD8, 0xFF],
        });
        assert!(body.to_form().is_ok());
        assert!(body.to_form().is_ok());

        let broken = MultipartBody::default().file(FilePart {
            field: "image".into(),
            file_name: "x".into(),
            mime: "not a mime".into(),
            bytes: vec![],
        });
        assert!(broken.to_form().is_err());
    }
}
