// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Media blob store (Cloud Storage, with an in-memory backend for tests).
//!
//! Exercise demonstrations, symptom photos and videos, chat attachments and
//! voice notes all land here. Records in Firestore keep either the object
//! path or the resolved URL; this store turns one into the other.

use std::sync::Arc;

use dashmap::DashMap;
use google_cloud_storage::client::{Client, ClientConfig};
use google_cloud_storage::http::objects::delete::DeleteObjectRequest;
use google_cloud_storage::http::objects::get::GetObjectRequest;
use google_cloud_storage::http::objects::upload::{Media, UploadObjectRequest, UploadType};
use google_cloud_storage::http::Error as StorageError;

use crate::error::AppError;

/// One media part pulled out of a multipart request.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub data: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

/// Blob store handle, dispatching to Cloud Storage or the in-memory backend.
#[derive(Clone)]
pub enum MediaStore {
    Gcs {
        client: Arc<Client>,
        bucket: String,
        endpoint: String,
    },
    Memory {
        objects: Arc<DashMap<String, Vec<u8>>>,
    },
    /// Every upload fails with a transport error. Test helper for exercising
    /// failure paths.
    Failing,
}

impl MediaStore {
    /// Connect to the configured Cloud Storage bucket.
    ///
    /// If STORAGE_EMULATOR_HOST is set, connects to the emulator without
    /// credentials.
    pub async fn connect(bucket: &str) -> Result<Self, AppError> {
        let config = match std::env::var("STORAGE_EMULATOR_HOST") {
            Ok(host) => {
                let endpoint = if host.contains("://") {
                    host
                } else {
                    format!("http://{}", host)
                };
                tracing::info!(endpoint = %endpoint, "Using Cloud Storage emulator");
                let mut config = ClientConfig::default().anonymous();
                config.storage_endpoint = endpoint;
                config
            }
            Err(_) => ClientConfig::default().with_auth().await.map_err(|e| {
                AppError::Internal(anyhow::anyhow!(
                    "Failed to create storage auth config: {}",
                    e
                ))
            })?,
        };

        let endpoint = config.storage_endpoint.clone();
        Ok(MediaStore::Gcs {
            client: Arc::new(Client::new(config)),
            bucket: bucket.to_string(),
            endpoint,
        })
    }

    /// Create an in-memory store for tests and offline development.
    pub fn in_memory() -> Self {
        MediaStore::Memory {
            objects: Arc::new(DashMap::new()),
        }
    }

    /// Create a store whose uploads always fail.
    pub fn failing() -> Self {
        MediaStore::Failing
    }

    /// Upload a blob under the given object path and return its URL.
    pub async fn upload(
        &self,
        object: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AppError> {
        match self {
            MediaStore::Gcs { client, bucket, .. } => {
                let media = Media {
                    name: object.to_string().into(),
                    content_type: content_type.to_string().into(),
                    content_length: None,
                };
                client
                    .upload_object(
                        &UploadObjectRequest {
                            bucket: bucket.clone(),
                            ..Default::default()
                        },
                        data,
                        &UploadType::Simple(media),
                    )
                    .await
                    .map_err(|e| AppError::Transport(format!("Storage upload failed: {}", e)))?;
                Ok(self.object_url(object))
            }
            MediaStore::Memory { objects } => {
                objects.insert(object.to_string(), data);
                Ok(self.object_url(object))
            }
            MediaStore::Failing => Err(AppError::Transport(
                "Storage upload failed: simulated outage".to_string(),
            )),
        }
    }

    /// URL for an object path in this store.
    pub fn object_url(&self, object: &str) -> String {
        match self {
            MediaStore::Gcs {
                bucket, endpoint, ..
            } => format!("{}/{}/{}", endpoint, bucket, object),
            MediaStore::Memory { .. } | MediaStore::Failing => format!("memory://{}", object),
        }
    }

    /// Resolve a stored media reference to a fetchable URL.
    ///
    /// Object paths are resolved against this store; references that already
    /// carry a scheme come back unchanged.
    pub fn resolve_url(&self, reference: &str) -> String {
        if reference.contains("://") {
            reference.to_string()
        } else {
            self.object_url(reference)
        }
    }

    /// Delete an object. Deleting a missing object is not an error.
    pub async fn delete(&self, object: &str) -> Result<(), AppError> {
        match self {
            MediaStore::Gcs { client, bucket, .. } => {
                let result = client
                    .delete_object(&DeleteObjectRequest {
                        bucket: bucket.clone(),
                        object: object.to_string(),
                        ..Default::default()
                    })
                    .await;
                match result {
                    Ok(()) => Ok(()),
                    Err(StorageError::Response(ref e)) if e.code == 404 => Ok(()),
                    Err(e) => Err(AppError::Transport(format!("Storage delete failed: {}", e))),
                }
            }
            MediaStore::Memory { objects } => {
                objects.remove(object);
                Ok(())
            }
            MediaStore::Failing => Ok(()),
        }
    }

    /// Delete the object behind a URL previously returned from this store.
    /// URLs pointing elsewhere are ignored.
    pub async fn delete_by_url(&self, url: &str) -> Result<(), AppError> {
        match self.object_from_url(url) {
            Some(object) => self.delete(&object).await,
            None => {
                tracing::debug!(url, "Skipping delete of foreign media URL");
                Ok(())
            }
        }
    }

    /// Whether the object behind a URL currently exists.
    pub async fn exists_by_url(&self, url: &str) -> Result<bool, AppError> {
        let Some(object) = self.object_from_url(url) else {
            return Ok(false);
        };
        match self {
            MediaStore::Gcs { client, bucket, .. } => {
                let result = client
                    .get_object(&GetObjectRequest {
                        bucket: bucket.clone(),
                        object,
                        ..Default::default()
                    })
                    .await;
                match result {
                    Ok(_) => Ok(true),
                    Err(StorageError::Response(ref e)) if e.code == 404 => Ok(false),
                    Err(e) => Err(AppError::Transport(format!("Storage lookup failed: {}", e))),
                }
            }
            MediaStore::Memory { objects } => Ok(objects.contains_key(&object)),
            MediaStore::Failing => Ok(false),
        }
    }

    /// Recover the object path from a URL produced by `object_url`.
    fn object_from_url(&self, url: &str) -> Option<String> {
        match self {
            MediaStore::Gcs {
                bucket, endpoint, ..
            } => {
                let prefix = format!("{}/{}/", endpoint, bucket);
                url.strip_prefix(&prefix).map(str::to_string)
            }
            MediaStore::Memory { .. } | MediaStore::Failing => {
                url.strip_prefix("memory://").map(str::to_string)
            }
        }
    }
}

/// Restrict a client-supplied file name to characters safe in an object path.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}
