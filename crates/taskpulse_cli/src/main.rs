use anyhow::Context;
use clap::Parser;
use clap::error::ErrorKind;
use taskpulse_cli::cli::{AddArgs, Cli, Command, TaskCommand, UpdateArgs, parse_config_override};
use taskpulse_cli::output;
use taskpulse_core::advisor::{self, SharedModel};
use taskpulse_core::config::{self, Config, ConfigOverrides};
use taskpulse_core::error::AppError;
use taskpulse_core::model::timestamp::parse_timestamp;
use taskpulse_core::model::{NewTask, TaskPatch};
use taskpulse_core::notify;
use taskpulse_core::storage::json_store::Store;
use taskpulse_core::{burndown, directive_api, progress, stats, task_api, user_api};
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A second init (tests, embedding) is harmless, so the error is dropped.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn load_config(raw_overrides: &[String]) -> Result<Config, AppError> {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = &loaded.error {
        tracing::warn!(error = %err, "config not loaded, using defaults");
    }

    let mut overrides = ConfigOverrides::default();
    for raw in raw_overrides {
        let parsed = parse_config_override(raw).map_err(AppError::invalid_input)?;
        overrides.set(&parsed.key, &parsed.value)?;
    }
    Ok(config::merge_overrides(&loaded.config, &overrides))
}

fn parse_due(raw: &str) -> Result<OffsetDateTime, AppError> {
    parse_timestamp(raw).ok_or_else(|| {
        AppError::invalid_input(format!("due date must be RFC 3339 or YYYY-MM-DD, got '{raw}'"))
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string(value)
        .map_err(|err| AppError::invalid_data(format!("failed to render JSON: {err}")))?;
    println!("{rendered}");
    Ok(())
}

fn new_task(args: AddArgs) -> Result<NewTask, AppError> {
    Ok(NewTask {
        id: args.id,
        name: args.name,
        description: args.description,
        assignees: args.assignees,
        priority: args.priority,
        status: args.status,
        parent_id: args.parent,
        due_date: args.due.as_deref().map(parse_due).transpose()?,
        needs_help: args.needs_help,
    })
}

fn task_patch(args: &UpdateArgs) -> Result<TaskPatch, AppError> {
    let parent_id = if args.no_parent {
        Some(None)
    } else {
        args.parent.clone().map(Some)
    };
    let due_date = if args.clear_due {
        Some(None)
    } else {
        args.due.as_deref().map(parse_due).transpose()?.map(Some)
    };

    let patch = TaskPatch {
        name: args.name.clone(),
        description: args.description.clone(),
        assignees: (!args.assignees.is_empty()).then(|| args.assignees.clone()),
        priority: args.priority,
        status: args.status,
        parent_id,
        due_date,
        needs_help: args.needs_help,
    };
    if patch.is_empty() {
        return Err(AppError::invalid_input("nothing to update"));
    }
    Ok(patch)
}

fn model(config: &Config) -> Result<SharedModel, AppError> {
    advisor::model_from_config(&config.model)
}

fn run_task_command(
    command: TaskCommand,
    store: &Store,
    config: &Config,
    json: bool,
) -> Result<(), AppError> {
    match command {
        TaskCommand::List {
            main_only,
            help_needed,
        } => {
            let mut report = task_api::task_progress(store)?;
            report.retain(|entry| {
                (!main_only || entry.task.is_main()) && (!help_needed || entry.task.wants_help())
            });
            if json {
                print_json(&report)?;
            } else if report.is_empty() {
                println!("No tasks yet.");
            } else {
                println!("{}", output::render_task_table(&report));
            }
        }
        TaskCommand::Show { id } => {
            let task = task_api::get_task(store, &id)?;
            if json {
                print_json(&task)?;
            } else {
                let all = task_api::list_tasks(store)?;
                let percent = progress::compute_progress(&task, &all);
                println!("{}", output::render_task_detail(&task, percent));
            }
        }
        TaskCommand::Add(args) => {
            let task = task_api::create_task(store, new_task(args)?, OffsetDateTime::now_utc())?;
            if json {
                print_json(&task)?;
            } else {
                println!("Added task: {} ({})", task.name, task.id);
            }
        }
        TaskCommand::Update(args) => {
            let patch = task_patch(&args)?;
            let task = task_api::update_task(
                store,
                &args.id,
                patch,
                config.strict_completion,
                OffsetDateTime::now_utc(),
            )?;
            if json {
                print_json(&task)?;
            } else {
                println!("Updated task: {} ({}) [{}]", task.name, task.id, task.status.label());
            }
        }
        TaskCommand::Delete { id } => {
            let outcome = task_api::delete_task(store, &id)?;
            if json {
                print_json(&outcome)?;
            } else {
                println!("{}", outcome.message);
            }
        }
        TaskCommand::Progress => {
            let report = task_api::task_progress(store)?;
            if json {
                print_json(&report)?;
            } else {
                for entry in &report {
                    println!("{} | {} | {}%", entry.task.id, entry.task.name, entry.progress);
                }
            }
        }
    }
    Ok(())
}

fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli.config_override)?;
    let store = Store::new(config.data_dir()?);
    let json = cli.json;

    match cli.command {
        Command::Serve { listen } => return serve(listen, store, config),
        Command::Task { task } => run_task_command(task, &store, &config, json)?,
        Command::Burndown { record } => {
            let today = OffsetDateTime::now_utc().date();
            let estimate = if record {
                let point = burndown::record_snapshot(&store, today)?;
                burndown::BurndownEstimate {
                    actual: point.actual,
                    ideal: point.ideal,
                }
            } else {
                burndown::estimate_burndown(&task_api::list_tasks(&store)?, today)
            };
            if json {
                print_json(&estimate)?;
            } else {
                println!("{}", output::render_burndown(&estimate));
                if record {
                    println!("Recorded snapshot for {today}");
                }
            }
        }
        Command::Stats => {
            let tasks = task_api::list_tasks(&store)?;
            let users = user_api::list_users(&store)?;
            let figures = stats::project_stats(&tasks, &users);
            if json {
                print_json(&figures)?;
            } else {
                println!("{}", output::render_stats(&figures));
            }
        }
        Command::Import { file } => {
            let content = std::fs::read_to_string(&file)
                .map_err(|err| AppError::io(format!("{}: {}", file.display(), err)))?;
            let payload: serde_json::Value = serde_json::from_str(&content).map_err(|err| {
                AppError::invalid_input(format!("invalid JSON in {}: {}", file.display(), err))
            })?;
            let count = task_api::import_tasks(&store, payload)?;
            if json {
                print_json(&serde_json::json!({ "count": count }))?;
            } else {
                println!("Imported {count} tasks");
            }
        }
        Command::Export => {
            println!("{}", task_api::export_tasks(&store)?);
        }
        Command::Notify => {
            let model = model(&config)?;
            let tasks = task_api::list_tasks(&store)?;
            let directives = directive_api::list_directives(&store)?;
            let advice = advisor::notification(
                model.as_ref(),
                &tasks,
                &directives,
                &config.model.language,
            )?;
            if let Err(err) = notify::notifier_from_env().and_then(|n| n.notify(&advice)) {
                tracing::warn!(error = %err, "desktop notification failed");
            }
            if json {
                print_json(&advice)?;
            } else {
                println!("{}\n{}", notify::headline(advice.kind), advice.notification);
            }
        }
        Command::Summary => {
            let model = model(&config)?;
            let tasks = task_api::list_tasks(&store)?;
            let directives = directive_api::list_directives(&store)?;
            let summary = advisor::project_summary(
                model.as_ref(),
                &tasks,
                &directives,
                &config.model.language,
            )?;
            if json {
                print_json(&summary)?;
            } else {
                println!("{}", summary.summary);
                for risk in &summary.risks {
                    println!("risk: {risk}");
                }
                for recommendation in &summary.recommendations {
                    println!("recommendation: {recommendation}");
                }
            }
        }
        Command::SuggestDescription { name } => {
            let model = model(&config)?;
            let suggestion =
                advisor::suggest_description(model.as_ref(), &name, &config.model.language)?;
            if json {
                print_json(&suggestion)?;
            } else {
                println!("{}", suggestion.suggested_description);
            }
        }
    }

    Ok(())
}

fn serve(listen: Option<String>, store: Store, config: Config) -> anyhow::Result<()> {
    let model = model(&config)?;
    let addr = listen.unwrap_or_else(|| config.listen.clone());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        let state = taskpulse_http::AppState::new(store, config, model);
        taskpulse_http::serve(listener, state, async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %err, "ctrl-c handler unavailable");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down");
        })
        .await
        .context("server stopped unexpectedly")
    })
}

fn main() {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {err:#}");
        std::process::exit(1);
    }
}
