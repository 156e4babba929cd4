// Copyright (C) 2025 Tessera Cloud Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Workflow sequencer.
//!
//! Composes facade calls and status waits into end-to-end scenarios:
//! provision a workspace, attach template sources, run commands, inspect
//! outputs, tear down. Each orchestrator owns one scenario's cancellation
//! token; independent scenarios share nothing and can run concurrently.
//!
//! Ordering enforced here, per the remote protocol: an upload only happens
//! against a created workspace, a command that depends on template content is
//! only submitted after the upload's status wait has returned, and output
//! inspection follows a completed apply. Teardown is the one best-effort
//! step: its errors are reported, never fatal to a cleanup sequence.

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::archive::TemplateArchive;
use crate::config::SdkConfig;
use crate::error::{Result, SdkError};
use crate::facade::ServiceFacade;
use crate::poll::wait_for_status;
use crate::types::{
    Activity, ActivityHandle, ActivityStatus, CommandKind, CommandOptions, CreateWorkspaceOptions,
    DeleteWorkspaceOptions, OutputValue, ResourceRecord, RunOptions, UploadResult, Workspace,
    WorkspaceStatus,
};

/// Sequences facade calls and status waits for one workflow scenario.
pub struct Orchestrator<'a, F: ServiceFacade> {
    facade: &'a F,
    config: &'a SdkConfig,
    cancel: CancellationToken,
}

impl<'a, F: ServiceFacade> Orchestrator<'a, F> {
    /// Create an orchestrator over a facade and configuration.
    pub fn new(facade: &'a F, config: &'a SdkConfig) -> Self {
        Self {
            facade,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned cancellation token, so a caller can abort
    /// every wait this orchestrator issues.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token cancelling this orchestrator's waits.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Create a workspace and wait for it to settle out of `DRAFT`.
    ///
    /// Returns the re-fetched workspace once it reports `INACTIVE`, or an
    /// error; there is no outcome with neither.
    #[instrument(skip(self, options), fields(name = %options.name))]
    pub async fn provision(&self, options: &CreateWorkspaceOptions) -> Result<Workspace> {
        if options.name.is_empty() {
            return Err(SdkError::InvalidInput("workspace name is empty".to_string()));
        }
        let created = self.facade.create_workspace(options).await?;
        info!(workspace_id = %created.id, status = %created.status, "workspace created");

        self.wait_for_workspace_status(&created.id, WorkspaceStatus::Inactive)
            .await?;
        self.facade.get_workspace(&created.id).await
    }

    /// Upload a template archive and wait for the workspace to be ready
    /// again.
    ///
    /// Targets the workspace's first template. The workspace transitions
    /// through scanning states while the service ingests the archive; this
    /// returns once it reports `INACTIVE`.
    #[instrument(skip(self, workspace, archive), fields(workspace_id = %workspace.id))]
    pub async fn attach_source(
        &self,
        workspace: &Workspace,
        archive: TemplateArchive,
    ) -> Result<UploadResult> {
        let template = workspace.primary_template().ok_or_else(|| {
            SdkError::InvalidInput(format!("workspace {} has no template", workspace.id))
        })?;

        let result = self
            .facade
            .upload_archive(&workspace.id, &template.id, archive)
            .await?;
        if !result.has_received_file {
            return Err(SdkError::Api {
                status: 200,
                code: "UPLOAD_NOT_ACKNOWLEDGED".to_string(),
                message: "service did not acknowledge the uploaded file".to_string(),
            });
        }

        self.wait_for_workspace_status(&workspace.id, WorkspaceStatus::Inactive)
            .await?;
        info!(workspace_id = %workspace.id, upload_id = %result.id, "template source attached");
        Ok(result)
    }

    /// Submit a command and wait for its activity to complete.
    ///
    /// Returns the final activity record. Use [`Orchestrator::start_command`]
    /// when the caller wants to observe an in-progress activity instead.
    #[instrument(skip(self, workspace, options), fields(workspace_id = %workspace.id, command = %kind))]
    pub async fn run_command(
        &self,
        workspace: &Workspace,
        kind: CommandKind,
        options: &RunOptions,
    ) -> Result<Activity> {
        let handle = self.start_command(workspace, kind, options).await?;
        self.wait_activity(&handle).await
    }

    /// Submit a command without waiting for it (fire-and-forget).
    pub async fn start_command(
        &self,
        workspace: &Workspace,
        kind: CommandKind,
        options: &RunOptions,
    ) -> Result<ActivityHandle> {
        let handle = match &kind {
            CommandKind::Plan => self.facade.plan(&workspace.id, options).await?,
            CommandKind::Apply => self.facade.apply(&workspace.id, options).await?,
            CommandKind::Destroy => self.facade.destroy(&workspace.id, options).await?,
            CommandKind::Refresh => self.facade.refresh(&workspace.id, options).await?,
            CommandKind::Custom(cmd) => {
                let mut command_options = CommandOptions::new(cmd.clone());
                command_options.comment = options.comment.clone();
                self.facade
                    .run_command(&workspace.id, &command_options)
                    .await?
            }
        };
        info!(workspace_id = %workspace.id, activity_id = %handle.activity_id, command = %kind, "command submitted");
        Ok(handle)
    }

    /// Submit an arbitrary remote command with full [`CommandOptions`] and
    /// wait for its activity to complete.
    ///
    /// Unlike [`Orchestrator::run_command`] with [`CommandKind::Custom`],
    /// this path carries command parameters through to the service.
    #[instrument(skip(self, workspace, options), fields(workspace_id = %workspace.id, command = %options.command))]
    pub async fn run_custom(
        &self,
        workspace: &Workspace,
        options: &CommandOptions,
    ) -> Result<Activity> {
        let handle = self.facade.run_command(&workspace.id, options).await?;
        info!(workspace_id = %workspace.id, activity_id = %handle.activity_id, command = %options.command, "command submitted");
        self.wait_activity(&handle).await
    }

    /// Wait for a started activity to reach `COMPLETED`, then return its
    /// final record.
    pub async fn wait_activity(&self, handle: &ActivityHandle) -> Result<Activity> {
        let entity = format!("activity {}", handle.activity_id);
        let facade = self.facade;
        let workspace_id = handle.workspace_id.as_str();
        let activity_id = handle.activity_id.as_str();
        wait_for_status(
            &entity,
            move || async move {
                let activity = facade.get_activity(workspace_id, activity_id).await?;
                Ok(activity.status)
            },
            ActivityStatus::Completed,
            &self.config.poll,
            &self.cancel,
        )
        .await?;
        self.facade
            .get_activity(&handle.workspace_id, &handle.activity_id)
            .await
    }

    /// Fetch output values of an applied workspace.
    pub async fn outputs(&self, workspace: &Workspace) -> Result<Vec<OutputValue>> {
        self.facade.get_outputs(&workspace.id).await
    }

    /// List resources under management of an applied workspace.
    pub async fn resources(&self, workspace: &Workspace) -> Result<Vec<ResourceRecord>> {
        self.facade.get_resources(&workspace.id).await
    }

    /// Best-effort workspace deletion.
    ///
    /// Errors are logged and returned, but callers running a cleanup sequence
    /// treat them as non-fatal. Deleting an already deleted workspace yields
    /// a not-found error value; it never panics. Deletion is accepted even
    /// when no template content was ever uploaded.
    #[instrument(skip(self, options))]
    pub async fn teardown(
        &self,
        workspace_id: &str,
        options: &DeleteWorkspaceOptions,
    ) -> Result<()> {
        match self.facade.delete_workspace(workspace_id, options).await {
            Ok(()) => {
                info!(workspace_id, "workspace deleted");
                Ok(())
            }
            Err(err) => {
                warn!(workspace_id, %err, "teardown failed");
                Err(err)
            }
        }
    }

    async fn wait_for_workspace_status(
        &self,
        workspace_id: &str,
        target: WorkspaceStatus,
    ) -> Result<WorkspaceStatus> {
        let entity = format!("workspace {}", workspace_id);
        let facade = self.facade;
        wait_for_status(
            &entity,
            move || async move {
                let ws = facade.get_workspace(workspace_id).await?;
                Ok(ws.status)
            },
            target,
            &self.config.poll,
            &self.cancel,
        )
        .await
    }
}
