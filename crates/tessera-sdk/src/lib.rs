// Copyright (C) 2025 Tessera Cloud Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Tessera SDK
//!
//! Client SDK for the Tessera infrastructure-automation API: workspaces
//! binding infrastructure-as-code templates to managed execution state,
//! mutated by asynchronous command activities (plan/apply/destroy/refresh).
//!
//! # Architecture
//!
//! Three layers:
//! - [`ServiceFacade`]: one typed call per remote endpoint. The shipped
//!   implementation is [`HttpFacade`] (HTTPS REST, JSON bodies, multipart
//!   archive upload); tests substitute in-memory fakes.
//! - [`poll`]: the status-wait primitive. The service is pull-only, so
//!   completion of a long-running command is observed by re-reading its
//!   status, bounded by a deadline and cancellable, with backoff and jitter.
//! - [`Orchestrator`]: sequences facade calls and waits into scenarios
//!   (provision → attach source → run command → inspect → teardown).
//!
//! # Example
//!
//! ```no_run
//! use tessera_sdk::{
//!     CommandKind, CreateWorkspaceOptions, DeleteWorkspaceOptions, HttpFacade, Orchestrator,
//!     RunOptions, SdkConfig, TemplateArchive, TemplateSpec, Variable,
//! };
//!
//! # async fn example() -> tessera_sdk::Result<()> {
//! let config = SdkConfig::from_env()?;
//! let facade = HttpFacade::new(&config)?;
//! let flow = Orchestrator::new(&facade, &config);
//!
//! let options = CreateWorkspaceOptions::new("payments-staging").with_template(
//!     TemplateSpec::new(".", "terraform_v0.11.14")
//!         .with_variable(Variable::new("region", "eu-de")),
//! );
//! let workspace = flow.provision(&options).await?;
//!
//! let archive = TemplateArchive::pack_directory("./infra")?;
//! flow.attach_source(&workspace, archive).await?;
//!
//! let activity = flow
//!     .run_command(&workspace, CommandKind::Apply, &RunOptions::new())
//!     .await?;
//! println!("apply finished: {}", activity.status);
//!
//! for output in flow.outputs(&workspace).await? {
//!     println!("{} = {}", output.name, output.value);
//! }
//!
//! flow.teardown(&workspace.id, &DeleteWorkspaceOptions::new()).await.ok();
//! # Ok(())
//! # }
//! ```

mod archive;
mod config;
mod error;
mod facade;
mod http;
pub mod poll;
mod types;
mod workflow;

pub use archive::TemplateArchive;
pub use config::SdkConfig;
pub use error::{Result, SdkError};
pub use facade::ServiceFacade;
pub use http::HttpFacade;
pub use poll::{PollConfig, PollState, wait_for_status};
pub use types::{
    Activity, ActivityHandle, ActivityStatus, CommandKind, CommandOptions, CreateWorkspaceOptions,
    DeleteWorkspaceOptions, ListActivitiesOptions, ListActivitiesResult, ListWorkspacesOptions,
    ListWorkspacesResult, OutputValue, ResourceRecord, RunOptions, Template, TemplateSpec,
    UpdateWorkspaceOptions, UploadResult, Variable, Workspace, WorkspaceStatus, WorkspaceSummary,
};
pub use workflow::Orchestrator;
