//! Typed request bodies for endpoints that accept an optional file.
//!
//! A [`Submission`] is either a JSON document or a multipart form carrying
//! the same fields plus at most one file. Handlers match on the variant
//! instead of probing an untyped body.

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::validate::FileMeta;
use crate::api::ApiError;

/// Fallback content type for parts that declare none and have no
/// recognizable extension.
const OCTET_STREAM: &str = "application/octet-stream";

/// A file received in a multipart request.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Client-supplied filename.
    pub name: Option<String>,
    /// Declared content type.
    pub mime_type: String,
    /// File contents.
    pub bytes: Bytes,
}

impl IncomingFile {
    /// Borrowed metadata for policy validation.
    #[must_use]
    pub fn meta(&self) -> FileMeta<'_> {
        FileMeta {
            name: self.name.as_deref(),
            mime_type: &self.mime_type,
            size_bytes: self.bytes.len() as u64,
        }
    }
}

/// Errors produced while decoding a request body.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("Invalid value for {0}")]
    Invalid(&'static str),

    #[error("Invalid multipart body: {0}")]
    Multipart(String),

    #[error("Invalid JSON body: {0}")]
    Json(String),

    #[error("Only one file may be attached")]
    DuplicateFile,

    #[error("Content-Type must be application/json or multipart/form-data")]
    UnsupportedContentType,
}

/// Text fields collected from a multipart body.
#[derive(Debug, Default, Clone)]
pub struct FormFields {
    values: HashMap<String, String>,
}

impl FormFields {
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Trimmed value of `name`; blank values count as absent.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<String> {
        self.values
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn required(&self, name: &'static str) -> Result<String, FormError> {
        self.text(name).ok_or(FormError::Missing(name))
    }

    /// Parses an optional value with [`FromStr`].
    pub fn parse<T: FromStr>(&self, name: &'static str) -> Result<Option<T>, FormError> {
        self.text(name)
            .map(|v| v.parse().map_err(|_| FormError::Invalid(name)))
            .transpose()
    }

    /// Parses an optional boolean written as `true`/`false` or `1`/`0`.
    pub fn flag(&self, name: &'static str) -> Result<Option<bool>, FormError> {
        self.text(name)
            .map(|v| match v.to_ascii_lowercase().as_str() {
                "true" | "1" | "on" | "yes" => Ok(true),
                "false" | "0" | "off" | "no" => Ok(false),
                _ => Err(FormError::Invalid(name)),
            })
            .transpose()
    }
}

/// Builds a request type from multipart text fields.
pub trait MultipartForm: Sized {
    /// Name of the part that carries the file.
    const FILE_FIELD: &'static str;

    fn from_form(fields: &FormFields) -> Result<Self, FormError>;
}

/// Request body that is either JSON or multipart with an optional file.
#[derive(Debug)]
pub enum Submission<T> {
    Json(T),
    Multipart { fields: T, file: Option<IncomingFile> },
}

impl<T> Submission<T> {
    /// Splits into the decoded fields and the attached file, if any.
    pub fn into_parts(self) -> (T, Option<IncomingFile>) {
        match self {
            Self::Json(fields) => (fields, None),
            Self::Multipart { fields, file } => (fields, file),
        }
    }
}

impl<S, T> FromRequest<S> for Submission<T>
where
    S: Send + Sync,
    T: DeserializeOwned + MultipartForm + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| FormError::Multipart(e.body_text()))?;
            let (fields, file) = read_multipart(multipart, T::FILE_FIELD).await?;
            Ok(Self::Multipart {
                fields: T::from_form(&fields)?,
                file,
            })
        } else if content_type.starts_with("application/json") {
            let Json(fields) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| FormError::Json(e.body_text()))?;
            Ok(Self::Json(fields))
        } else {
            Err(FormError::UnsupportedContentType.into())
        }
    }
}

/// Reads every part of `multipart`, keeping text fields and the single
/// file sent under `file_field`.
///
/// Empty file parts, which browsers send when no file was chosen, are
/// treated as absent.
pub async fn read_multipart(
    mut multipart: Multipart,
    file_field: &str,
) -> Result<(FormFields, Option<IncomingFile>), FormError> {
    let mut fields = FormFields::default();
    let mut file: Option<IncomingFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| FormError::Multipart(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);

        if name != file_field {
            if file_name.is_none() {
                let value = field
                    .text()
                    .await
                    .map_err(|e| FormError::Multipart(e.body_text()))?;
                fields.insert(name, value);
            }
            continue;
        }

        let declared = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| FormError::Multipart(e.body_text()))?;

        if bytes.is_empty() && file_name.as_deref().is_none_or(str::is_empty) {
            continue;
        }
        if file.is_some() {
            return Err(FormError::DuplicateFile);
        }

        let mime_type = declared
            .or_else(|| {
                file_name
                    .as_deref()
                    .and_then(|n| mime_guess::from_path(n).first())
                    .map(|m| m.to_string())
            })
            .unwrap_or_else(|| OCTET_STREAM.to_string());

        file = Some(IncomingFile {
            name: file_name,
            mime_type,
            bytes,
        });
    }

    Ok((fields, file))
}
