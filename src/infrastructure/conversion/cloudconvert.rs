//! Cloud conversion client (CloudConvert v2 jobs API)

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::domain::conversion::{ConversionError, ConverterKind, PdfConverter};

pub const DEFAULT_BASE_URL: &str = "https://api.cloudconvert.com/v2";
pub const DEFAULT_SYNC_BASE_URL: &str = "https://sync.api.cloudconvert.com/v2";

const IMPORT_TASK: &str = "import-file";
const CONVERT_TASK: &str = "convert-file";
const EXPORT_TASK: &str = "export-file";

/// Job error code the service uses when the account has no credits left
const CREDITS_EXCEEDED_CODE: &str = "CREDITS_EXCEEDED";

#[derive(Debug, Deserialize)]
struct JobEnvelope {
    data: Job,
}

#[derive(Debug, Deserialize)]
struct Job {
    id: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    tasks: Vec<Task>,
}

#[derive(Debug, Deserialize)]
struct Task {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: Option<TaskResult>,
}

#[derive(Debug, Deserialize)]
struct TaskResult {
    #[serde(default)]
    form: Option<UploadForm>,
    #[serde(default)]
    files: Vec<ExportedFile>,
}

#[derive(Debug, Deserialize)]
struct UploadForm {
    url: String,
    #[serde(default)]
    parameters: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ExportedFile {
    #[serde(default)]
    url: Option<String>,
}

impl Job {
    fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name.as_deref() == Some(name))
    }

    fn upload_form(&self) -> Option<&UploadForm> {
        self.task(IMPORT_TASK)?.result.as_ref()?.form.as_ref()
    }

    fn export_url(&self) -> Option<&str> {
        self.task(EXPORT_TASK)?
            .result
            .as_ref()?
            .files
            .first()?
            .url
            .as_deref()
    }

    fn failed_task(&self) -> Option<&Task> {
        self.tasks
            .iter()
            .find(|t| t.status.as_deref() == Some("error"))
    }
}

/// Mask an API key for logs: first four and last four characters
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.is_empty() {
        return "(not set)".to_string();
    }
    if chars.len() <= 8 {
        return "****".to_string();
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn request_failed(e: reqwest::Error) -> ConversionError {
    ConversionError::http(
        e.status().map(|s| s.as_u16()).unwrap_or(0),
        format!("request failed: {}", e),
    )
}

/// Turn a non-success response into the matching conversion error
async fn status_error(response: Response) -> ConversionError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    match status {
        StatusCode::PAYMENT_REQUIRED => ConversionError::quota_exceeded(body),
        StatusCode::TOO_MANY_REQUESTS => ConversionError::rate_limited(body),
        _ => ConversionError::http(status.as_u16(), body),
    }
}

async fn check(response: Response) -> Result<Response, ConversionError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(status_error(response).await)
    }
}

/// Client for the three-step import, convert, export job flow
#[derive(Debug, Clone)]
pub struct CloudConvertClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    sync_base_url: String,
}

impl CloudConvertClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        sync_base_url: impl Into<String>,
    ) -> Result<Self, ConversionError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(request_failed)?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            sync_base_url: sync_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn create_job(&self) -> Result<Job, ConversionError> {
        let body = json!({
            "tasks": {
                IMPORT_TASK: { "operation": "import/upload" },
                CONVERT_TASK: {
                    "operation": "convert",
                    "input": IMPORT_TASK,
                    "output_format": "pdf"
                },
                EXPORT_TASK: {
                    "operation": "export/url",
                    "input": CONVERT_TASK
                }
            }
        });

        let response = self
            .client
            .post(format!("{}/jobs", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(request_failed)?;

        let envelope: JobEnvelope = check(response).await?.json().await.map_err(request_failed)?;
        Ok(envelope.data)
    }

    async fn upload(&self, form: &UploadForm, input: &Path) -> Result<(), ConversionError> {
        let bytes = tokio::fs::read(input).await?;
        let file_name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let mut multipart = Form::new();
        for (key, value) in &form.parameters {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            multipart = multipart.text(key.clone(), value);
        }
        multipart = multipart.part("file", Part::bytes(bytes).file_name(file_name));

        let response = self
            .client
            .post(&form.url)
            .multipart(multipart)
            .send()
            .await
            .map_err(request_failed)?;

        check(response).await?;
        Ok(())
    }

    /// Block until the job finishes, using the synchronous API endpoint
    async fn wait(&self, job_id: &str) -> Result<Job, ConversionError> {
        let response = self
            .client
            .get(format!("{}/jobs/{}", self.sync_base_url, job_id))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(request_failed)?;

        let envelope: JobEnvelope = check(response).await?.json().await.map_err(request_failed)?;
        let job = envelope.data;

        if job.status.as_deref() == Some("error") {
            let (code, message) = job
                .failed_task()
                .map(|t| {
                    (
                        t.code.clone().unwrap_or_default(),
                        t.message.clone().unwrap_or_else(|| "conversion job failed".to_string()),
                    )
                })
                .unwrap_or_else(|| (String::new(), "conversion job failed".to_string()));

            return Err(if code == CREDITS_EXCEEDED_CODE {
                ConversionError::quota_exceeded(message)
            } else {
                ConversionError::job_failed(message)
            });
        }

        Ok(job)
    }

    async fn download(&self, url: &str, output: &Path) -> Result<(), ConversionError> {
        let response = self.client.get(url).send().await.map_err(request_failed)?;
        let bytes = check(response).await?.bytes().await.map_err(request_failed)?;

        tokio::fs::write(output, &bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl PdfConverter for CloudConvertClient {
    fn kind(&self) -> ConverterKind {
        ConverterKind::Cloud
    }

    #[instrument(skip_all, fields(input = %input.display()))]
    async fn convert_to_pdf(&self, input: &Path, output: &Path) -> Result<PathBuf, ConversionError> {
        let job = self.create_job().await?;
        debug!(job_id = %job.id, "Created conversion job");

        let form = job.upload_form().ok_or(ConversionError::MissingUploadTarget)?;
        self.upload(form, input).await?;

        let finished = self.wait(&job.id).await?;
        let url = finished.export_url().ok_or(ConversionError::MissingExportUrl)?;

        self.download(url, output).await?;
        info!(job_id = %job.id, output = %output.display(), "Cloud conversion finished");

        Ok(output.to_path_buf())
    }
}
