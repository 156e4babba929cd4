// Copyright (C) 2025 Tessera Cloud Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTTP binding of the remote service facade.
//!
//! JSON request/response bodies everywhere except the archive upload, which
//! is `multipart/form-data` carrying the tar archive. A non-2xx response is
//! always an error, even when a partial body is present; its structured
//! `{code, message}` payload is decoded when available and the raw text kept
//! otherwise.

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::archive::TemplateArchive;
use crate::config::SdkConfig;
use crate::error::{Result, SdkError};
use crate::facade::ServiceFacade;
use crate::types::{
    Activity, ActivityHandle, CommandOptions, CreateWorkspaceOptions, DeleteWorkspaceOptions,
    ListActivitiesOptions, ListActivitiesResult, ListWorkspacesOptions, ListWorkspacesResult,
    OutputValue, ResourceRecord, RunOptions, UpdateWorkspaceOptions, UploadResult, Workspace,
};

/// Structured error payload the service returns on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// reqwest-backed [`ServiceFacade`] implementation.
pub struct HttpFacade {
    client: Client,
    base_url: String,
    api_token: String,
}

impl std::fmt::Debug for HttpFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFacade")
            .field("base_url", &self.base_url)
            .field("api_token", &"***")
            .finish()
    }
}

impl HttpFacade {
    /// Build a facade from the given configuration.
    pub fn new(config: &SdkConfig) -> Result<Self> {
        if config.api_token.is_empty() {
            return Err(SdkError::Config("api_token is not set".to_string()));
        }
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.header("Authorization", format!("Bearer {}", self.api_token))
    }

    /// Decode a 2xx response body, or map the error payload of a non-2xx
    /// response. `not_found` is the error a 404 maps to.
    async fn decode<T: DeserializeOwned>(
        &self,
        response: Response,
        not_found: Option<SdkError>,
    ) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }
        Err(Self::error_from(status, response, not_found).await)
    }

    async fn expect_empty(&self, response: Response, not_found: Option<SdkError>) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(Self::error_from(status, response, not_found).await)
    }

    async fn error_from(
        status: StatusCode,
        response: Response,
        not_found: Option<SdkError>,
    ) -> SdkError {
        if status == StatusCode::NOT_FOUND {
            if let Some(err) = not_found {
                return err;
            }
        }
        let text = response.text().await.unwrap_or_default();
        let body: ApiErrorBody = serde_json::from_str(&text).unwrap_or(ApiErrorBody {
            code: String::new(),
            message: text,
        });
        debug!(status = status.as_u16(), code = %body.code, "api error response");
        SdkError::Api {
            status: status.as_u16(),
            code: body.code,
            message: body.message,
        }
    }

    async fn start_run(
        &self,
        workspace_id: &str,
        kind: &str,
        options: &RunOptions,
    ) -> Result<ActivityHandle> {
        let url = self.url(&format!("/v1/workspaces/{}/{}", workspace_id, kind));
        let response = self.authed(self.client.post(&url)).json(options).send().await?;
        let handle: ActivityHandle = self
            .decode(
                response,
                Some(SdkError::WorkspaceNotFound(workspace_id.to_string())),
            )
            .await?;
        debug!(workspace_id, kind, activity_id = %handle.activity_id, "run accepted");
        Ok(handle)
    }
}

#[async_trait]
impl ServiceFacade for HttpFacade {
    #[instrument(skip(self, options), fields(name = %options.name))]
    async fn create_workspace(&self, options: &CreateWorkspaceOptions) -> Result<Workspace> {
        let response = self
            .authed(self.client.post(self.url("/v1/workspaces")))
            .json(options)
            .send()
            .await?;
        self.decode(response, None).await
    }

    #[instrument(skip(self))]
    async fn get_workspace(&self, workspace_id: &str) -> Result<Workspace> {
        let url = self.url(&format!("/v1/workspaces/{}", workspace_id));
        let response = self.authed(self.client.get(&url)).send().await?;
        self.decode(
            response,
            Some(SdkError::WorkspaceNotFound(workspace_id.to_string())),
        )
        .await
    }

    #[instrument(skip(self, options))]
    async fn list_workspaces(
        &self,
        options: &ListWorkspacesOptions,
    ) -> Result<ListWorkspacesResult> {
        let response = self
            .authed(self.client.get(self.url("/v1/workspaces")))
            .query(&[("limit", options.limit), ("offset", options.offset)])
            .send()
            .await?;
        self.decode(response, None).await
    }

    #[instrument(skip(self, options))]
    async fn update_workspace(
        &self,
        workspace_id: &str,
        options: &UpdateWorkspaceOptions,
    ) -> Result<Workspace> {
        let url = self.url(&format!("/v1/workspaces/{}", workspace_id));
        let response = self.authed(self.client.put(&url)).json(options).send().await?;
        self.decode(
            response,
            Some(SdkError::WorkspaceNotFound(workspace_id.to_string())),
        )
        .await
    }

    #[instrument(skip(self, options))]
    async fn delete_workspace(
        &self,
        workspace_id: &str,
        options: &DeleteWorkspaceOptions,
    ) -> Result<()> {
        let url = self.url(&format!("/v1/workspaces/{}", workspace_id));
        let response = self
            .authed(self.client.delete(&url))
            .query(&[("destroy_resources", options.destroy_resources)])
            .send()
            .await?;
        self.expect_empty(
            response,
            Some(SdkError::WorkspaceNotFound(workspace_id.to_string())),
        )
        .await
    }

    #[instrument(skip(self, archive), fields(file = %archive.file_name, size = archive.len()))]
    async fn upload_archive(
        &self,
        workspace_id: &str,
        template_id: &str,
        archive: TemplateArchive,
    ) -> Result<UploadResult> {
        if archive.is_empty() {
            return Err(SdkError::InvalidInput("archive is empty".to_string()));
        }
        let url = self.url(&format!(
            "/v1/workspaces/{}/templates/{}/archive",
            workspace_id, template_id
        ));
        let part = multipart::Part::bytes(archive.bytes)
            .file_name(archive.file_name)
            .mime_str("application/gzip")
            .map_err(|e| SdkError::InvalidInput(e.to_string()))?;
        let form = multipart::Form::new().part("file", part);
        let response = self
            .authed(self.client.put(&url))
            .multipart(form)
            .send()
            .await?;
        self.decode(
            response,
            Some(SdkError::WorkspaceNotFound(workspace_id.to_string())),
        )
        .await
    }

    #[instrument(skip(self, options))]
    async fn list_activities(
        &self,
        workspace_id: &str,
        options: &ListActivitiesOptions,
    ) -> Result<ListActivitiesResult> {
        let url = self.url(&format!("/v1/workspaces/{}/activities", workspace_id));
        let response = self
            .authed(self.client.get(&url))
            .query(&[("limit", options.limit), ("offset", options.offset)])
            .send()
            .await?;
        self.decode(
            response,
            Some(SdkError::WorkspaceNotFound(workspace_id.to_string())),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn get_activity(&self, workspace_id: &str, activity_id: &str) -> Result<Activity> {
        let url = self.url(&format!(
            "/v1/workspaces/{}/activities/{}",
            workspace_id, activity_id
        ));
        let response = self.authed(self.client.get(&url)).send().await?;
        self.decode(
            response,
            Some(SdkError::ActivityNotFound(activity_id.to_string())),
        )
        .await
    }

    async fn plan(&self, workspace_id: &str, options: &RunOptions) -> Result<ActivityHandle> {
        self.start_run(workspace_id, "plan", options).await
    }

    async fn apply(&self, workspace_id: &str, options: &RunOptions) -> Result<ActivityHandle> {
        self.start_run(workspace_id, "apply", options).await
    }

    async fn destroy(&self, workspace_id: &str, options: &RunOptions) -> Result<ActivityHandle> {
        self.start_run(workspace_id, "destroy", options).await
    }

    async fn refresh(&self, workspace_id: &str, options: &RunOptions) -> Result<ActivityHandle> {
        self.start_run(workspace_id, "refresh", options).await
    }

    #[instrument(skip(self, options), fields(command = %options.command))]
    async fn run_command(
        &self,
        workspace_id: &str,
        options: &CommandOptions,
    ) -> Result<ActivityHandle> {
        let url = self.url(&format!("/v1/workspaces/{}/commands", workspace_id));
        let response = self.authed(self.client.post(&url)).json(options).send().await?;
        self.decode(
            response,
            Some(SdkError::WorkspaceNotFound(workspace_id.to_string())),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn get_outputs(&self, workspace_id: &str) -> Result<Vec<OutputValue>> {
        let url = self.url(&format!("/v1/workspaces/{}/outputs", workspace_id));
        let response = self.authed(self.client.get(&url)).send().await?;
        self.decode(
            response,
            Some(SdkError::WorkspaceNotFound(workspace_id.to_string())),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn get_resources(&self, workspace_id: &str) -> Result<Vec<ResourceRecord>> {
        let url = self.url(&format!("/v1/workspaces/{}/resources", workspace_id));
        let response = self.authed(self.client.get(&url)).send().await?;
        self.decode(
            response,
            Some(SdkError::WorkspaceNotFound(workspace_id.to_string())),
        )
        .await
    }
}
