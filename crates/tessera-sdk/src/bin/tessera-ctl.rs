// Copyright (C) 2025 Tessera Cloud Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Tessera Control CLI
//!
//! CLI tool for interacting with the Tessera API.
//!
//! Usage:
//!   tessera-ctl <command> [options]
//!
//! Commands:
//!   list                          List workspaces
//!   create --name <name> [--folder <f>] [--type <t>] [--var k=v]...
//!   get <workspace_id>
//!   upload <workspace_id> --dir <path> | --archive <path>
//!   plan|apply|destroy|refresh <workspace_id> [--no-wait] [--poll <ms>]
//!   wait <workspace_id> <activity_id> [--poll <ms>]
//!   activities <workspace_id> [--limit <n>]
//!   outputs <workspace_id>
//!   delete <workspace_id> [--destroy-resources]

use std::process::ExitCode;
use std::time::Duration;

use tessera_sdk::{
    CommandKind, CreateWorkspaceOptions, DeleteWorkspaceOptions, HttpFacade,
    ListActivitiesOptions, ListWorkspacesOptions, Orchestrator, RunOptions, SdkConfig,
    ServiceFacade, TemplateArchive, TemplateSpec, Variable,
};

fn print_usage() {
    eprintln!(
        r#"Usage: tessera-ctl <command> [options]

Interact with the Tessera API.

COMMANDS:
    list                            List workspaces
    create                          Create a workspace and wait for it to settle
    get <workspace_id>              Get workspace details
    upload <workspace_id>           Upload template sources
    plan <workspace_id>             Run plan
    apply <workspace_id>            Run apply
    destroy <workspace_id>          Run destroy
    refresh <workspace_id>          Run refresh
    wait <workspace_id> <activity_id>   Wait for an activity to complete
    activities <workspace_id>       List workspace activities
    outputs <workspace_id>          Show output values
    delete <workspace_id>           Delete a workspace (best effort)

CREATE OPTIONS:
    --name <name>                   Workspace name (required)
    --description <text>            Description
    --folder <path>                 Template folder inside the archive (default: .)
    --type <type>                   Template type (default: terraform_v0.11.14)
    --var <k=v>                     Template variable, repeatable

UPLOAD OPTIONS:
    --dir <path>                    Pack this directory into a tar.gz and upload
    --archive <path>                Upload an existing tar.gz

RUN OPTIONS:
    --no-wait                       Submit and print the activity id without waiting
    --poll <ms>                     Poll interval in ms (default: 2000)

DELETE OPTIONS:
    --destroy-resources             Destroy managed resources before deleting

ENVIRONMENT:
    TESSERA_API_URL                 API base URL (default: http://127.0.0.1:3000)
    TESSERA_API_TOKEN               Bearer token
    TESSERA_CREDENTIALS_FILE        JSON credentials file

EXAMPLES:
    # Create a workspace with variables
    tessera-ctl create --name staging --var region=eu-de --var replicas=3

    # Upload template sources and apply
    tessera-ctl upload ws_123 --dir ./infra
    tessera-ctl apply ws_123

    # Inspect outputs after a completed apply
    tessera-ctl outputs ws_123
"#
    );
}

#[derive(Debug, PartialEq)]
enum Command {
    List,
    Create {
        name: String,
        description: Option<String>,
        folder: String,
        template_type: String,
        vars: Vec<(String, String)>,
    },
    Get {
        workspace_id: String,
    },
    Upload {
        workspace_id: String,
        dir: Option<String>,
        archive: Option<String>,
    },
    Run {
        workspace_id: String,
        kind: String,
        no_wait: bool,
        poll_ms: u64,
    },
    Wait {
        workspace_id: String,
        activity_id: String,
        poll_ms: u64,
    },
    Activities {
        workspace_id: String,
        limit: u32,
    },
    Outputs {
        workspace_id: String,
    },
    Delete {
        workspace_id: String,
        destroy_resources: bool,
    },
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut args = args.iter();
    let command = args.next().ok_or("missing command")?;

    match command.as_str() {
        "list" => Ok(Command::List),
        "create" => {
            let mut name = None;
            let mut description = None;
            let mut folder = ".".to_string();
            let mut template_type = "terraform_v0.11.14".to_string();
            let mut vars = Vec::new();
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--name" => name = Some(args.next().ok_or("--name requires a value")?.clone()),
                    "--description" => {
                        description =
                            Some(args.next().ok_or("--description requires a value")?.clone());
                    }
                    "--folder" => {
                        folder = args.next().ok_or("--folder requires a value")?.clone();
                    }
                    "--type" => {
                        template_type = args.next().ok_or("--type requires a value")?.clone();
                    }
                    "--var" => {
                        let kv = args.next().ok_or("--var requires k=v")?;
                        let (k, v) = kv.split_once('=').ok_or("--var requires k=v")?;
                        vars.push((k.to_string(), v.to_string()));
                    }
                    other => return Err(format!("unknown option: {}", other)),
                }
            }
            Ok(Command::Create {
                name: name.ok_or("--name is required")?,
                description,
                folder,
                template_type,
                vars,
            })
        }
        "get" => Ok(Command::Get {
            workspace_id: args.next().ok_or("get requires <workspace_id>")?.clone(),
        }),
        "upload" => {
            let workspace_id = args.next().ok_or("upload requires <workspace_id>")?.clone();
            let mut dir = None;
            let mut archive = None;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--dir" => dir = Some(args.next().ok_or("--dir requires a value")?.clone()),
                    "--archive" => {
                        archive = Some(args.next().ok_or("--archive requires a value")?.clone());
                    }
                    other => return Err(format!("unknown option: {}", other)),
                }
            }
            if dir.is_none() == archive.is_none() {
                return Err("upload requires exactly one of --dir or --archive".to_string());
            }
            Ok(Command::Upload {
                workspace_id,
                dir,
                archive,
            })
        }
        kind @ ("plan" | "apply" | "destroy" | "refresh") => {
            let workspace_id = args
                .next()
                .ok_or_else(|| format!("{} requires <workspace_id>", kind))?
                .clone();
            let mut no_wait = false;
            let mut poll_ms: u64 = 2000;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--no-wait" => no_wait = true,
                    "--poll" => {
                        poll_ms = args
                            .next()
                            .ok_or("--poll requires a number")?
                            .parse()
                            .map_err(|_| "invalid poll interval")?;
                    }
                    other => return Err(format!("unknown option: {}", other)),
                }
            }
            Ok(Command::Run {
                workspace_id,
                kind: kind.to_string(),
                no_wait,
                poll_ms,
            })
        }
        "wait" => {
            let workspace_id = args.next().ok_or("wait requires <workspace_id>")?.clone();
            let activity_id = args.next().ok_or("wait requires <activity_id>")?.clone();
            let mut poll_ms: u64 = 2000;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--poll" => {
                        poll_ms = args
                            .next()
                            .ok_or("--poll requires a number")?
                            .parse()
                            .map_err(|_| "invalid poll interval")?;
                    }
                    other => return Err(format!("unknown option: {}", other)),
                }
            }
            Ok(Command::Wait {
                workspace_id,
                activity_id,
                poll_ms,
            })
        }
        "activities" => {
            let workspace_id = args
                .next()
                .ok_or("activities requires <workspace_id>")?
                .clone();
            let mut limit: u32 = 100;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--limit" => {
                        limit = args
                            .next()
                            .ok_or("--limit requires a number")?
                            .parse()
                            .map_err(|_| "invalid limit")?;
                    }
                    other => return Err(format!("unknown option: {}", other)),
                }
            }
            Ok(Command::Activities {
                workspace_id,
                limit,
            })
        }
        "outputs" => Ok(Command::Outputs {
            workspace_id: args.next().ok_or("outputs requires <workspace_id>")?.clone(),
        }),
        "delete" => {
            let workspace_id = args.next().ok_or("delete requires <workspace_id>")?.clone();
            let mut destroy_resources = false;
            for arg in args {
                match arg.as_str() {
                    "--destroy-resources" => destroy_resources = true,
                    other => return Err(format!("unknown option: {}", other)),
                }
            }
            Ok(Command::Delete {
                workspace_id,
                destroy_resources,
            })
        }
        other => Err(format!("unknown command: {}", other)),
    }
}

fn command_kind(kind: &str) -> CommandKind {
    match kind {
        "plan" => CommandKind::Plan,
        "apply" => CommandKind::Apply,
        "destroy" => CommandKind::Destroy,
        _ => CommandKind::Refresh,
    }
}

async fn run(command: Command) -> Result<(), String> {
    let mut config = SdkConfig::from_env().map_err(|e| e.to_string())?;

    // Per-invocation poll interval for run/wait commands.
    if let Command::Run { poll_ms, .. } | Command::Wait { poll_ms, .. } = &command {
        config.poll.interval = Duration::from_millis(*poll_ms);
    }

    let facade = HttpFacade::new(&config).map_err(|e| e.to_string())?;
    let flow = Orchestrator::new(&facade, &config);

    match command {
        Command::List => {
            let result = facade
                .list_workspaces(&ListWorkspacesOptions::new())
                .await
                .map_err(|e| e.to_string())?;
            println!(
                "{}",
                serde_json::to_string_pretty(&result).map_err(|e| e.to_string())?
            );
        }

        Command::Create {
            name,
            description,
            folder,
            template_type,
            vars,
        } => {
            let mut template = TemplateSpec::new(folder, template_type);
            for (k, v) in vars {
                template = template.with_variable(Variable::new(k, v));
            }
            let mut options = CreateWorkspaceOptions::new(name).with_template(template);
            if let Some(desc) = description {
                options = options.with_description(desc);
            }

            let workspace = flow.provision(&options).await.map_err(|e| e.to_string())?;
            println!("{}", workspace.id);
        }

        Command::Get { workspace_id } => {
            let workspace = facade
                .get_workspace(&workspace_id)
                .await
                .map_err(|e| e.to_string())?;
            println!(
                "{}",
                serde_json::to_string_pretty(&workspace).map_err(|e| e.to_string())?
            );
        }

        Command::Upload {
            workspace_id,
            dir,
            archive,
        } => {
            let archive = match (dir, archive) {
                (Some(dir), None) => {
                    TemplateArchive::pack_directory(&dir).map_err(|e| e.to_string())?
                }
                (None, Some(path)) => TemplateArchive::from_file(&path)
                    .await
                    .map_err(|e| e.to_string())?,
                _ => unreachable!("validated in parse_args"),
            };
            let workspace = facade
                .get_workspace(&workspace_id)
                .await
                .map_err(|e| e.to_string())?;
            let result = flow
                .attach_source(&workspace, archive)
                .await
                .map_err(|e| e.to_string())?;
            println!("{}", result.id);
        }

        Command::Run {
            workspace_id,
            kind,
            no_wait,
            ..
        } => {
            let workspace = facade
                .get_workspace(&workspace_id)
                .await
                .map_err(|e| e.to_string())?;
            if no_wait {
                let handle = flow
                    .start_command(&workspace, command_kind(&kind), &RunOptions::new())
                    .await
                    .map_err(|e| e.to_string())?;
                println!("{}", handle.activity_id);
            } else {
                let activity = flow
                    .run_command(&workspace, command_kind(&kind), &RunOptions::new())
                    .await
                    .map_err(|e| e.to_string())?;
                println!(
                    "{}",
                    serde_json::to_string_pretty(&activity).map_err(|e| e.to_string())?
                );
            }
        }

        Command::Wait {
            workspace_id,
            activity_id,
            ..
        } => {
            let handle = tessera_sdk::ActivityHandle {
                workspace_id,
                activity_id,
            };
            let activity = flow.wait_activity(&handle).await.map_err(|e| e.to_string())?;
            println!(
                "{}",
                serde_json::to_string_pretty(&activity).map_err(|e| e.to_string())?
            );
        }

        Command::Activities {
            workspace_id,
            limit,
        } => {
            let options = ListActivitiesOptions::new().with_limit(limit);
            let result = facade
                .list_activities(&workspace_id, &options)
                .await
                .map_err(|e| e.to_string())?;
            println!(
                "{}",
                serde_json::to_string_pretty(&result).map_err(|e| e.to_string())?
            );
        }

        Command::Outputs { workspace_id } => {
            let outputs = facade
                .get_outputs(&workspace_id)
                .await
                .map_err(|e| e.to_string())?;
            println!(
                "{}",
                serde_json::to_string_pretty(&outputs).map_err(|e| e.to_string())?
            );
        }

        Command::Delete {
            workspace_id,
            destroy_resources,
        } => {
            let options = DeleteWorkspaceOptions::new().with_destroy_resources(destroy_resources);
            match flow.teardown(&workspace_id, &options).await {
                Ok(()) => println!("Deleted: {}", workspace_id),
                // Best effort: an already-deleted workspace is fine.
                Err(err) if err.is_not_found() => {
                    println!("Already deleted: {}", workspace_id);
                }
                Err(err) => return Err(err.to_string()),
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("Error: {}", err);
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match run(command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
