// Copyright (C) 2025 Tessera Cloud Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Remote service facade contract.
//!
//! One typed call per remote endpoint. The workflow orchestrator depends only
//! on this trait; the HTTP binding in [`crate::http`] is the shipped
//! implementation, and tests substitute in-memory fakes.
//!
//! Every method returns either a value or an error. Transport failures,
//! application-level error payloads, and success are three distinct outcomes;
//! a call never yields "no result, no error".

use async_trait::async_trait;

use crate::archive::TemplateArchive;
use crate::error::Result;
use crate::types::{
    Activity, ActivityHandle, CommandOptions, CreateWorkspaceOptions, DeleteWorkspaceOptions,
    ListActivitiesOptions, ListActivitiesResult, ListWorkspacesOptions, ListWorkspacesResult,
    OutputValue, ResourceRecord, RunOptions, UpdateWorkspaceOptions, UploadResult, Workspace,
};

/// Typed client for the Tessera remote service.
#[async_trait]
pub trait ServiceFacade: Send + Sync {
    /// Create a workspace. The returned workspace starts in `DRAFT`.
    async fn create_workspace(&self, options: &CreateWorkspaceOptions) -> Result<Workspace>;

    /// Fetch a workspace by ID.
    async fn get_workspace(&self, workspace_id: &str) -> Result<Workspace>;

    /// List workspaces visible to the caller.
    async fn list_workspaces(
        &self,
        options: &ListWorkspacesOptions,
    ) -> Result<ListWorkspacesResult>;

    /// Update mutable workspace fields.
    async fn update_workspace(
        &self,
        workspace_id: &str,
        options: &UpdateWorkspaceOptions,
    ) -> Result<Workspace>;

    /// Delete a workspace. Accepted even when no template was ever uploaded.
    async fn delete_workspace(
        &self,
        workspace_id: &str,
        options: &DeleteWorkspaceOptions,
    ) -> Result<()>;

    /// Upload a tar archive as the source of one template.
    async fn upload_archive(
        &self,
        workspace_id: &str,
        template_id: &str,
        archive: TemplateArchive,
    ) -> Result<UploadResult>;

    /// List activities of a workspace.
    async fn list_activities(
        &self,
        workspace_id: &str,
        options: &ListActivitiesOptions,
    ) -> Result<ListActivitiesResult>;

    /// Fetch one activity. The activity ID is scoped to the workspace.
    async fn get_activity(&self, workspace_id: &str, activity_id: &str) -> Result<Activity>;

    /// Start a plan run.
    async fn plan(&self, workspace_id: &str, options: &RunOptions) -> Result<ActivityHandle>;

    /// Start an apply run.
    async fn apply(&self, workspace_id: &str, options: &RunOptions) -> Result<ActivityHandle>;

    /// Start a destroy run.
    async fn destroy(&self, workspace_id: &str, options: &RunOptions) -> Result<ActivityHandle>;

    /// Start a refresh run.
    async fn refresh(&self, workspace_id: &str, options: &RunOptions) -> Result<ActivityHandle>;

    /// Start an arbitrary remote command.
    async fn run_command(
        &self,
        workspace_id: &str,
        options: &CommandOptions,
    ) -> Result<ActivityHandle>;

    /// Fetch output values. Only meaningful after a completed apply.
    async fn get_outputs(&self, workspace_id: &str) -> Result<Vec<OutputValue>>;

    /// List resources under management. Only meaningful after a completed
    /// apply.
    async fn get_resources(&self, workspace_id: &str) -> Result<Vec<ResourceRecord>>;
}
