use anyhow::Context;
use axum::extract::Multipart;
use bytes::Bytes;
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

pub struct UploadedPicture {
    pub body: Bytes,
    pub content_type: String,
}

/// Fields parsed out of the multipart profile form. Everything is optional;
/// create and update decide what absence means.
#[derive(Default)]
pub struct ProfileForm {
    pub description: Option<String>,
    pub likes: Option<Vec<String>>,
    pub dislikes: Option<Vec<String>>,
    pub hobbies: Option<Vec<String>>,
    pub picture: Option<UploadedPicture>,
}

/// Split comma-separated tag input into an ordered list: trims whitespace,
/// drops empty entries, preserves order ("music, art" -> ["music", "art"]).
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

pub async fn read_profile_form(mut mp: Multipart) -> Result<ProfileForm, ApiError> {
    let mut form = ProfileForm::default();
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("description") => {
                form.description = Some(text_field(field).await?);
            }
            Some("likes") => {
                form.likes = Some(parse_tags(&text_field(field).await?));
            }
            Some("dislikes") => {
                form.dislikes = Some(parse_tags(&text_field(field).await?));
            }
            Some("hobbies") => {
                form.hobbies = Some(parse_tags(&text_field(field).await?));
            }
            Some("file") => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".into());
                let body = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(format!("failed to read file: {e}")))?;
                if !body.is_empty() {
                    form.picture = Some(UploadedPicture { body, content_type });
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

async fn text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::Validation(format!("malformed field: {e}")))
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

/// Generated key per upload, so concurrent uploads never collide.
pub fn picture_key(user_id: Uuid, content_type: &str) -> String {
    let ext = ext_from_mime(content_type).unwrap_or("bin");
    format!("profiles/{}/{}.{}", user_id, Uuid::new_v4(), ext)
}

/// Store an uploaded picture and return the key recorded on the profile.
pub async fn store_picture(
    st: &AppState,
    user_id: Uuid,
    picture: &UploadedPicture,
) -> anyhow::Result<String> {
    let key = picture_key(user_id, &picture.content_type);
    st.storage
        .put_object(&key, picture.body.clone())
        .await
        .with_context(|| format!("put_object {}", key))?;
    Ok(key)
}

/// Best-effort removal of a replaced or orphaned picture. The profile row is
/// authoritative; a leaked file is only noise.
pub async fn delete_picture(st: &AppState, key: &str) {
    if let Err(e) = st.storage.delete_object(key).await {
        warn!(error = %e, key = %key, "failed to delete stored picture");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tags_splits_and_trims() {
        assert_eq!(parse_tags("music, art"), vec!["music", "art"]);
        assert_eq!(parse_tags("  hiking ,cooking,  "), vec!["hiking", "cooking"]);
    }

    #[test]
    fn parse_tags_preserves_order() {
        assert_eq!(parse_tags("c,a,b"), vec!["c", "a", "b"]);
    }

    #[test]
    fn parse_tags_handles_empty_input() {
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" , ,").is_empty());
    }

    #[test]
    fn ext_from_mime_known_types() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("application/octet-stream"), None);
    }

    #[test]
    fn picture_keys_are_unique_per_upload() {
        let user = Uuid::new_v4();
        let a = picture_key(user, "image/png");
        let b = picture_key(user, "image/png");
        assert_ne!(a, b);
        assert!(a.starts_with(&format!("profiles/{}/", user)));
        assert!(a.ends_with(".png"));
    }

    async fn form_from(body: &'static str) -> ProfileForm {
        use axum::body::Body;
        use axum::extract::FromRequest;
        use axum::http::{header::CONTENT_TYPE, Request};

        let req = Request::builder()
            .header(CONTENT_TYPE, "multipart/form-data; boundary=XBOUND")
            .body(Body::from(body))
            .unwrap();
        let mp = Multipart::from_request(req, &()).await.expect("multipart");
        read_profile_form(mp).await.expect("form")
    }

    #[tokio::test]
    async fn read_profile_form_parses_fields_and_file() {
        let body = concat!(
            "--XBOUND\r\n",
            "Content-Disposition: form-data; name=\"description\"\r\n\r\n",
            "loves long walks\r\n",
            "--XBOUND\r\n",
            "Content-Disposition: form-data; name=\"likes\"\r\n\r\n",
            "music, art\r\n",
            "--XBOUND\r\n",
            "Content-Disposition: form-data; name=\"file\"; filename=\"me.png\"\r\n",
            "Content-Type: image/png\r\n\r\n",
            "PNGDATA\r\n",
            "--XBOUND--\r\n",
        );
        let form = form_from(body).await;
        assert_eq!(form.description.as_deref(), Some("loves long walks"));
        assert_eq!(
            form.likes,
            Some(vec!["music".to_string(), "art".to_string()])
        );
        assert!(form.dislikes.is_none());
        assert!(form.hobbies.is_none());
        let pic = form.picture.expect("picture");
        assert_eq!(pic.content_type, "image/png");
        assert_eq!(&pic.body[..], b"PNGDATA");
    }

    #[tokio::test]
    async fn read_profile_form_skips_empty_file_and_unknown_fields() {
        let body = concat!(
            "--XBOUND\r\n",
            "Content-Disposition: form-data; name=\"file\"; filename=\"\"\r\n",
            "Content-Type: application/octet-stream\r\n\r\n",
            "\r\n",
            "--XBOUND\r\n",
            "Content-Disposition: form-data; name=\"unexpected\"\r\n\r\n",
            "ignored\r\n",
            "--XBOUND--\r\n",
        );
        let form = form_from(body).await;
        assert!(form.picture.is_none());
        assert!(form.description.is_none());
    }

    #[tokio::test]
    async fn store_picture_returns_key() {
        let state = AppState::fake();
        let pic = UploadedPicture {
            body: Bytes::from_static(b"img"),
            content_type: "image/jpeg".into(),
        };
        let user = Uuid::new_v4();
        let key = store_picture(&state, user, &pic).await.expect("store");
        assert!(key.starts_with(&format!("profiles/{}/", user)));
        assert!(key.ends_with(".jpg"));
    }
}
