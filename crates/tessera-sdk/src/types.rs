// Copyright (C) 2025 Tessera Cloud Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! High-level types for the Tessera SDK.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workspace lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkspaceStatus {
    /// Workspace created, no template content uploaded yet.
    Draft,
    /// Remote side is fetching template sources.
    Connecting,
    /// Remote side is scanning uploaded template content.
    Scanning,
    /// Workspace is settled and ready to accept commands.
    Inactive,
    /// Workspace has applied resources under management.
    Active,
    /// Workspace is in a failed state.
    Failed,
    /// Status not recognized by this SDK version.
    #[serde(other)]
    Unknown,
}

impl WorkspaceStatus {
    /// Check if the workspace is settled enough to accept commands.
    pub fn is_ready(&self) -> bool {
        matches!(self, WorkspaceStatus::Inactive | WorkspaceStatus::Active)
    }

    /// Check if this is a terminal failure status.
    pub fn is_failure(&self) -> bool {
        matches!(self, WorkspaceStatus::Failed)
    }

    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkspaceStatus::Draft => "DRAFT",
            WorkspaceStatus::Connecting => "CONNECTING",
            WorkspaceStatus::Scanning => "SCANNING",
            WorkspaceStatus::Inactive => "INACTIVE",
            WorkspaceStatus::Active => "ACTIVE",
            WorkspaceStatus::Failed => "FAILED",
            WorkspaceStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for WorkspaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of an asynchronous activity (one command execution).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityStatus {
    /// Activity accepted, not yet started.
    Pending,
    /// Activity is currently executing.
    InProgress,
    /// Activity finished successfully.
    Completed,
    /// Activity finished with an error.
    Failed,
    /// Activity exceeded its remote execution deadline.
    TimedOut,
    /// Status not recognized by this SDK version.
    #[serde(other)]
    Unknown,
}

impl ActivityStatus {
    /// Check if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ActivityStatus::Completed | ActivityStatus::Failed | ActivityStatus::TimedOut
        )
    }

    /// Check if this is a terminal failure status.
    pub fn is_failure(&self) -> bool {
        matches!(self, ActivityStatus::Failed | ActivityStatus::TimedOut)
    }

    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Pending => "PENDING",
            ActivityStatus::InProgress => "IN_PROGRESS",
            ActivityStatus::Completed => "COMPLETED",
            ActivityStatus::Failed => "FAILED",
            ActivityStatus::TimedOut => "TIMED_OUT",
            ActivityStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of command an activity executes against a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    /// Produce an execution plan without changing resources.
    Plan,
    /// Apply the template, creating or updating resources.
    Apply,
    /// Destroy all resources managed by the workspace.
    Destroy,
    /// Refresh remote state against real resources.
    Refresh,
    /// An arbitrary remote command, passed through verbatim.
    Custom(String),
}

impl CommandKind {
    /// Wire name of the command.
    pub fn as_str(&self) -> &str {
        match self {
            CommandKind::Plan => "PLAN",
            CommandKind::Apply => "APPLY",
            CommandKind::Destroy => "DESTROY",
            CommandKind::Refresh => "REFRESH",
            CommandKind::Custom(cmd) => cmd.as_str(),
        }
    }

    /// Parse a wire name back into a command kind.
    pub fn from_wire(value: &str) -> Self {
        match value {
            "PLAN" => CommandKind::Plan,
            "APPLY" => CommandKind::Apply,
            "DESTROY" => CommandKind::Destroy,
            "REFRESH" => CommandKind::Refresh,
            other => CommandKind::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CommandKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CommandKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(CommandKind::from_wire(&s))
    }
}

/// One entry in a template's variable store.
///
/// A secure variable's value is never echoed by `Debug`; it still round-trips
/// intact over the wire.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Variable name.
    pub name: String,
    /// Variable value.
    pub value: String,
    /// Type tag (e.g. "string", "int", "map").
    #[serde(rename = "type", default)]
    pub var_type: String,
    /// Whether the value is sensitive and must not be logged.
    #[serde(default)]
    pub secure: bool,
    /// Whether the template's declared default should be used instead.
    #[serde(default)]
    pub use_default: bool,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

impl Variable {
    /// Create a plain (non-secure) variable.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            var_type: "string".to_string(),
            secure: false,
            use_default: false,
            description: String::new(),
        }
    }

    /// Create a secure variable whose value is redacted from logs.
    pub fn secure(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            secure: true,
            ..Self::new(name, value)
        }
    }

    /// Set the type tag.
    pub fn with_type(mut self, var_type: impl Into<String>) -> Self {
        self.var_type = var_type.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("name", &self.name)
            .field("value", if self.secure { &"***" } else { &self.value })
            .field("type", &self.var_type)
            .field("secure", &self.secure)
            .field("use_default", &self.use_default)
            .finish()
    }
}

/// A template definition scoped to one workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    /// Template ID, scoped within its workspace.
    pub id: String,
    /// Source folder within the uploaded archive.
    pub folder: String,
    /// Template engine type (e.g. "terraform_v0.11.14").
    #[serde(rename = "type")]
    pub template_type: String,
    /// Input variables.
    #[serde(default)]
    pub variables: Vec<Variable>,
}

/// A remote workspace binding templates to execution state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    /// Opaque workspace ID generated by the service.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Current lifecycle status.
    pub status: WorkspaceStatus,
    /// Tags attached to the workspace.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Template definitions held by the workspace.
    #[serde(default)]
    pub templates: Vec<Template>,
    /// When the workspace was created.
    pub created_at: DateTime<Utc>,
    /// When the workspace was last updated.
    pub updated_at: Option<DateTime<Utc>>,
    /// ID of the most recent activity, if any.
    pub last_activity_id: Option<String>,
}

impl Workspace {
    /// First template of the workspace, if any.
    ///
    /// Uploads and command runs target this template in the common
    /// single-template case.
    pub fn primary_template(&self) -> Option<&Template> {
        self.templates.first()
    }
}

/// Summary of a workspace (used in list results).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceSummary {
    /// Workspace ID.
    pub id: String,
    /// Workspace name.
    pub name: String,
    /// Current status.
    pub status: WorkspaceStatus,
    /// When the workspace was created.
    pub created_at: DateTime<Utc>,
}

/// Result of listing workspaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListWorkspacesResult {
    /// Workspaces in this page.
    pub workspaces: Vec<WorkspaceSummary>,
    /// Total count across all pages.
    pub total_count: u32,
}

/// One asynchronous command execution against a workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Opaque activity ID, scoped to its workspace.
    pub id: String,
    /// Workspace this activity ran against.
    pub workspace_id: String,
    /// Command the activity executes.
    pub command: CommandKind,
    /// Current status.
    pub status: ActivityStatus,
    /// Human-readable progress or error message.
    #[serde(default)]
    pub message: String,
    /// When the activity was accepted.
    pub created_at: DateTime<Utc>,
    /// When execution started, if it has.
    pub started_at: Option<DateTime<Utc>>,
    /// When execution finished, if it has.
    pub finished_at: Option<DateTime<Utc>>,
    /// Principal that triggered the activity.
    pub performed_by: Option<String>,
}

/// Handle to a pending activity.
///
/// An activity ID is only meaningful together with the workspace that
/// produced it, so the handle always carries both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityHandle {
    /// Workspace the activity belongs to.
    pub workspace_id: String,
    /// Activity ID.
    pub activity_id: String,
}

/// Result of listing activities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListActivitiesResult {
    /// Activities in this page.
    pub activities: Vec<Activity>,
    /// Total count across all pages.
    pub total_count: u32,
}

/// One output value of an applied workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputValue {
    /// Output name.
    pub name: String,
    /// Output value.
    pub value: serde_json::Value,
    /// Whether the value is sensitive.
    #[serde(default)]
    pub sensitive: bool,
}

/// Summary of one resource under workspace management.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Resource ID assigned by the provider.
    pub id: String,
    /// Resource name from the template.
    pub name: String,
    /// Provider resource type.
    pub resource_type: String,
}

/// Result of an archive upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResult {
    /// Upload record ID.
    pub id: String,
    /// Whether the service acknowledged receiving the file.
    pub has_received_file: bool,
}

/// A template spec used when creating a workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSpec {
    /// Source folder within the archive to be uploaded.
    pub folder: String,
    /// Template engine type.
    #[serde(rename = "type")]
    pub template_type: String,
    /// Input variables.
    #[serde(default)]
    pub variables: Vec<Variable>,
}

impl TemplateSpec {
    /// Create a spec with required fields.
    pub fn new(folder: impl Into<String>, template_type: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            template_type: template_type.into(),
            variables: Vec::new(),
        }
    }

    /// Replace the variable list.
    pub fn with_variables(mut self, variables: Vec<Variable>) -> Self {
        self.variables = variables;
        self
    }

    /// Add a single variable.
    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }
}

/// Options for creating a workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkspaceOptions {
    /// Workspace name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Tags to attach.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Template specs the workspace starts with.
    #[serde(default)]
    pub templates: Vec<TemplateSpec>,
}

impl CreateWorkspaceOptions {
    /// Create options with the required name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            tags: Vec::new(),
            templates: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Add a template spec.
    pub fn with_template(mut self, template: TemplateSpec) -> Self {
        self.templates.push(template);
        self
    }
}

/// Options for updating a workspace. All fields optional; unset fields are
/// left untouched by the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateWorkspaceOptions {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Replacement tag list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Replacement template specs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates: Option<Vec<TemplateSpec>>,
}

impl UpdateWorkspaceOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a new name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set a new description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the tag list.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Replace the template specs.
    pub fn with_templates(mut self, templates: Vec<TemplateSpec>) -> Self {
        self.templates = Some(templates);
        self
    }
}

/// Options for deleting a workspace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteWorkspaceOptions {
    /// Destroy managed resources before deleting the workspace record.
    pub destroy_resources: bool,
}

impl DeleteWorkspaceOptions {
    /// Create options with defaults (keep resources).
    pub fn new() -> Self {
        Self::default()
    }

    /// Also destroy managed resources.
    pub fn with_destroy_resources(mut self, destroy: bool) -> Self {
        self.destroy_resources = destroy;
        self
    }
}

/// Options for running a built-in command (plan/apply/destroy/refresh).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunOptions {
    /// Comment recorded on the activity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Resource targets to limit the run to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,
}

impl RunOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the activity comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Add a resource target.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.targets.push(target.into());
        self
    }
}

/// Options for running an arbitrary remote command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandOptions {
    /// Command name, passed through verbatim.
    pub command: String,
    /// Command parameters, opaque to the SDK.
    #[serde(default)]
    pub params: BTreeMap<String, serde_json::Value>,
    /// Comment recorded on the activity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl CommandOptions {
    /// Create options with the required command name.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            params: BTreeMap::new(),
            comment: None,
        }
    }

    /// Add a parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Set the activity comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Options for listing workspaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListWorkspacesOptions {
    /// Max results to return.
    pub limit: u32,
    /// Offset into the result set.
    pub offset: u32,
}

impl Default for ListWorkspacesOptions {
    fn default() -> Self {
        Self {
            limit: 100,
            offset: 0,
        }
    }
}

impl ListWorkspacesOptions {
    /// Create options with default paging.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Set the page offset.
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }
}

/// Options for listing activities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListActivitiesOptions {
    /// Max results to return.
    pub limit: u32,
    /// Offset into the result set.
    pub offset: u32,
}

impl Default for ListActivitiesOptions {
    fn default() -> Self {
        Self {
            limit: 100,
            offset: 0,
        }
    }
}

impl ListActivitiesOptions {
    /// Create options with default paging.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Set the page offset.
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }
}
