use super::{ApiError, DrillsApi};
use crate::config::Settings;
use crate::model::{
    Drill, DrillId, DrillUpdate, GeneratedImage, GeneratedShort, HealthStatus, MediaBlob,
    MediaKind, NewTestAttempt, Short, Test, TestAttempt, TestId, TestInput, TestStats,
    UploadedMedia,
};
use reqwest::Method;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::USER_AGENT;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

const AGENT: &str = concat!("drill_studio/", env!("CARGO_PKG_VERSION"));

/// Cliente HTTP bloqueante contra el API de drills.
#[derive(Clone)]
pub struct HttpClient {
    base_url: String,
    client: Client,
    upload_timeout: Duration,
    generation_timeout: Duration,
}

impl HttpClient {
    pub fn new(settings: &Settings) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(map_transport_error)?;
        Ok(Self {
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            client,
            upload_timeout: settings.upload_timeout(),
            generation_timeout: settings.generation_timeout(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header(USER_AGENT, AGENT)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        log::debug!("GET {path}");
        let response = self
            .request(Method::GET, path)
            .send()
            .map_err(map_transport_error)?;
        read_json(response)
    }

    fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        log::debug!("{method} {path}");
        let response = self
            .request(method, path)
            .json(body)
            .send()
            .map_err(map_transport_error)?;
        read_json(response)
    }

    fn delete(&self, path: &str) -> Result<(), ApiError> {
        log::debug!("DELETE {path}");
        let response = self
            .request(Method::DELETE, path)
            .send()
            .map_err(map_transport_error)?;
        check_status(response).map(|_| ())
    }
}

fn map_transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else if err.is_decode() {
        ApiError::Decode(err.to_string())
    } else if let Some(status) = err.status() {
        ApiError::from_status(status.as_u16(), "")
    } else {
        ApiError::Network(err.to_string())
    }
}

fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    let err = ApiError::from_status(status.as_u16(), &body);
    log::warn!("API devolvió HTTP {status}: {err}");
    Err(err)
}

fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let response = check_status(response)?;
    let text = response.text().map_err(map_transport_error)?;
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}

#[derive(Serialize)]
struct ImageQuery<'a> {
    search_query: &'a str,
}

impl DrillsApi for HttpClient {
    fn list_drills(&self) -> Result<Vec<Drill>, ApiError> {
        self.get_json("/drills/")
    }

    fn create_drill(&self) -> Result<Drill, ApiError> {
        log::debug!("POST /drills/");
        let response = self
            .request(Method::POST, "/drills/")
            .send()
            .map_err(map_transport_error)?;
        read_json(response)
    }

    fn update_drill(&self, id: DrillId, update: &DrillUpdate) -> Result<Drill, ApiError> {
        self.send_json(Method::PUT, &format!("/drills/{id}"), update)
    }

    fn delete_drill(&self, id: DrillId) -> Result<(), ApiError> {
        self.delete(&format!("/drills/{id}"))
    }

    fn upload_media(
        &self,
        drill_id: DrillId,
        kind: MediaKind,
        blob: &MediaBlob,
    ) -> Result<UploadedMedia, ApiError> {
        if blob.is_empty() {
            return Err(ApiError::EmptyPayload);
        }
        let path = format!("/upload-media/{drill_id}/{kind}");
        log::info!(
            "subiendo {kind} para drill {drill_id}: {} bytes ({})",
            blob.len(),
            blob.mime
        );
        let part = Part::bytes(blob.bytes.clone())
            .file_name(blob.file_name(kind))
            .mime_str(blob.essence())
            .map_err(map_transport_error)?;
        let form = Form::new().part("file", part);

        // Sin reintentos: si falla, el usuario vuelve a grabar.
        let response = self
            .request(Method::POST, &path)
            .timeout(self.upload_timeout)
            .multipart(form)
            .send()
            .map_err(map_transport_error)?;
        read_json(response)
    }

    fn generate_image(
        &self,
        drill_id: DrillId,
        search_phrase: &str,
    ) -> Result<GeneratedImage, ApiError> {
        let path = format!("/generate-image/{drill_id}");
        log::info!("generando imagen para drill {drill_id}");
        let response = self
            .request(Method::POST, &path)
            .timeout(self.generation_timeout)
            .json(&ImageQuery {
                search_query: search_phrase,
            })
            .send()
            .map_err(map_transport_error)?;
        read_json(response)
    }

    fn list_tests(&self) -> Result<Vec<Test>, ApiError> {
        self.get_json("/tests/")
    }

    fn create_test(&self, input: &TestInput) -> Result<Test, ApiError> {
        self.send_json(Method::POST, "/tests/", input)
    }

    fn update_test(&self, id: TestId, input: &TestInput) -> Result<Test, ApiError> {
        self.send_json(Method::PUT, &format!("/tests/{id}"), input)
    }

    fn delete_test(&self, id: TestId) -> Result<(), ApiError> {
        self.delete(&format!("/tests/{id}"))
    }

    fn test_stats(&self, id: TestId) -> Result<TestStats, ApiError> {
        self.get_json(&format!("/tests/{id}/stats"))
    }

    fn create_test_attempt(&self, attempt: &NewTestAttempt) -> Result<TestAttempt, ApiError> {
        self.send_json(Method::POST, "/test-attempts/", attempt)
    }

    fn list_test_attempts(&self, test_id: Option<TestId>) -> Result<Vec<TestAttempt>, ApiError> {
        match test_id {
            Some(id) => self.get_json(&format!("/test-attempts/?test_id={id}")),
            None => self.get_json("/test-attempts/"),
        }
    }

    fn list_shorts(&self) -> Result<Vec<Short>, ApiError> {
        self.get_json("/shorts/")
    }

    fn generate_short(&self, drill_id: DrillId) -> Result<GeneratedShort, ApiError> {
        log::info!("generando short para drill {drill_id}");
        let response = self
            .request(Method::POST, &format!("/generate-short/{drill_id}"))
            .timeout(self.generation_timeout)
            .send()
            .map_err(map_transport_error)?;
        read_json(response)
    }

    fn delete_short(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/shorts/{id}"))
    }

    fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get_json("/health")
    }
}
