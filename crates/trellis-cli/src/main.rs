mod secrets;

use anyhow::Context;
use chrono::{Duration, Utc};
use secrets::{SecretKey, SecretStore};
use std::sync::Arc;
use tokio::time::sleep;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use trellis_config::{validate_column, AppConfig, ColumnSettings, ConfigManager};
use trellis_core::{ExternalLabel, ItemStatus, LabelKind};
use trellis_sync::{BoardService, BoardSettings, HttpBoardBackend};

const SERVICE_NAME: &str = "trellis-mail";

/// Longest snooze the CLI accepts, in hours.
const MAX_SNOOZE_HOURS: i64 = 24 * 365;

const USAGE: &str = "usage: trellis [MAILBOX]
       trellis move <ITEM-ID> <STATUS> [MAILBOX]
       trellis snooze <ITEM-ID> <HOURS> [MAILBOX]
       trellis add-column <NAME> [LABEL]
       trellis set-token <TOKEN>
       trellis clear-token";

enum Command {
    Show {
        mailbox: Option<String>,
    },
    Move {
        item_id: String,
        status: ItemStatus,
        mailbox: Option<String>,
    },
    Snooze {
        item_id: String,
        hours: i64,
        mailbox: Option<String>,
    },
    AddColumn {
        name: String,
        binding: Option<String>,
    },
    SetToken {
        token: String,
    },
    ClearToken,
}

impl Command {
    fn mailbox(&self) -> Option<&str> {
        match self {
            Command::Show { mailbox }
            | Command::Move { mailbox, .. }
            | Command::Snooze { mailbox, .. } => mailbox.as_deref(),
            Command::AddColumn { .. } | Command::SetToken { .. } | Command::ClearToken => None,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let command = parse_command();
    let secrets = SecretStore::new(SERVICE_NAME);

    match &command {
        Command::SetToken { token } => {
            secrets
                .set(&token_key(), token)
                .context("store access token in the keychain")?;
            println!("access token stored");
            return Ok(());
        }
        Command::ClearToken => {
            secrets
                .delete(&token_key())
                .context("remove access token from the keychain")?;
            println!("access token cleared");
            return Ok(());
        }
        _ => {}
    }

    let manager = ConfigManager::new().context("initialize config manager")?;
    let config = manager.load().context("load app config")?;

    let access_token = match std::env::var("TRELLIS_ACCESS_TOKEN") {
        Ok(token) if !token.is_empty() => Some(token),
        _ => secrets
            .get(&token_key())
            .context("read access token from the keychain")?,
    };

    let settings = BoardSettings {
        endpoint: config.network.endpoint.to_string(),
        access_token,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;

    runtime.block_on(run(command, manager, config, settings))
}

fn token_key() -> SecretKey {
    SecretKey {
        namespace: "board".to_string(),
        id: "access_token".to_string(),
    }
}

fn parse_command() -> Command {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => Command::Show { mailbox: None },
        Some("-h") | Some("--help") | Some("help") => {
            println!("{USAGE}");
            std::process::exit(0);
        }
        Some("move") => {
            let (Some(item_id), Some(raw_status)) = (args.get(1), args.get(2)) else {
                usage_exit();
            };
            let status = match raw_status.parse::<ItemStatus>() {
                Ok(status) => status,
                Err(message) => {
                    eprintln!("{message}");
                    std::process::exit(1);
                }
            };
            Command::Move {
                item_id: item_id.clone(),
                status,
                mailbox: args.get(3).cloned(),
            }
        }
        Some("snooze") => {
            let (Some(item_id), Some(raw_hours)) = (args.get(1), args.get(2)) else {
                usage_exit();
            };
            let hours = match parse_snooze_hours(raw_hours) {
                Ok(hours) => hours,
                Err(message) => {
                    eprintln!("{message}");
                    std::process::exit(1);
                }
            };
            Command::Snooze {
                item_id: item_id.clone(),
                hours,
                mailbox: args.get(3).cloned(),
            }
        }
        Some("add-column") => {
            let Some(name) = args.get(1) else {
                usage_exit();
            };
            Command::AddColumn {
                name: name.clone(),
                binding: args.get(2).cloned(),
            }
        }
        Some("set-token") => {
            let Some(token) = args.get(1) else {
                usage_exit();
            };
            Command::SetToken {
                token: token.clone(),
            }
        }
        Some("clear-token") => Command::ClearToken,
        Some(mailbox) => Command::Show {
            mailbox: Some(mailbox.to_string()),
        },
    }
}

fn usage_exit() -> ! {
    eprintln!("{USAGE}");
    std::process::exit(1);
}

fn parse_snooze_hours(raw: &str) -> Result<i64, String> {
    match raw.parse::<i64>() {
        Ok(hours) if (1..=MAX_SNOOZE_HOURS).contains(&hours) => Ok(hours),
        _ => Err(format!(
            "snooze hours must be between 1 and {MAX_SNOOZE_HOURS}"
        )),
    }
}

async fn run(
    command: Command,
    manager: ConfigManager,
    config: AppConfig,
    settings: BoardSettings,
) -> anyhow::Result<()> {
    let service = BoardService::new(Arc::new(HttpBoardBackend::new()), settings);

    if let Command::AddColumn { name, binding } = &command {
        return add_column(&service, &manager, &config, name, binding.as_deref()).await;
    }

    let mailbox = command
        .mailbox()
        .unwrap_or(&config.general.start_mailbox)
        .to_string();
    service
        .select_mailbox(&mailbox)
        .await
        .with_context(|| format!("load board for {mailbox}"))?;

    match &command {
        Command::Move { item_id, status, .. } => {
            if let Err(error) = service.move_item(item_id, *status).await {
                tracing::warn!("move failed: {error}");
            }
        }
        Command::Snooze { item_id, hours, .. } => {
            let until = Utc::now() + Duration::hours(*hours);
            if let Err(error) = service.snooze_item(item_id, until).await {
                tracing::warn!("snooze failed: {error}");
            }
        }
        _ => {}
    }

    wait_for_summaries(&service).await;
    render_board(&service, &mailbox).await;

    for notice in service.notices().await {
        println!("! {}", notice.message);
    }

    if matches!(command, Command::Show { .. }) {
        match service.list_labels().await {
            Ok(labels) => {
                report_column_issues(&config, &labels);
                render_labels(&labels);
            }
            Err(error) => tracing::warn!("label listing failed: {error}"),
        }
    }

    Ok(())
}

async fn add_column(
    service: &BoardService,
    manager: &ConfigManager,
    config: &AppConfig,
    name: &str,
    binding: Option<&str>,
) -> anyhow::Result<()> {
    let labels = match service.list_labels().await {
        Ok(labels) => labels,
        Err(error) => {
            tracing::warn!("label listing failed, validating without it: {error}");
            Vec::new()
        }
    };

    let draft = ColumnSettings {
        name: name.to_string(),
        label_binding: binding.map(str::to_string),
    };
    let validation = validate_column(&config.board.columns, &draft, None, &labels);
    if !validation.is_valid() {
        for error in &validation.errors {
            eprintln!("{error}");
        }
        std::process::exit(1);
    }
    if let Some(advisory) = &validation.advisory {
        println!("note: {advisory}");
    }

    let mut updated = config.clone();
    updated.board.columns.push(draft);
    manager.save(&updated).context("save app config")?;
    println!("column '{name}' added");
    Ok(())
}

async fn wait_for_summaries(service: &BoardService) {
    for _ in 0..40 {
        if !service.has_pending_summaries().await {
            return;
        }
        sleep(std::time::Duration::from_millis(250)).await;
    }
}

async fn render_board(service: &BoardService, mailbox: &str) {
    let Some(snapshot) = service.snapshot().await else {
        println!("no board loaded for {mailbox}");
        return;
    };

    println!("Board: {mailbox}");
    for status in ItemStatus::ALL {
        let column = snapshot.column(status);
        println!();
        println!("{} ({})", status.title(), column.len());
        for item in column {
            let mut line = format!(
                "  {} <{}>: {}",
                item.sender_name, item.sender_email, item.subject
            );
            if service.is_pending(&item.id).await {
                line.push_str(" [updating]");
            }
            println!("{line}");
            if let Some(summary) = item.summary.as_deref() {
                println!("    {summary}");
            } else if service.is_summarizing(&item.id).await {
                println!("    [summarizing]");
            }
        }
    }
}

fn render_labels(labels: &[ExternalLabel]) {
    println!();
    println!("Labels:");
    for label in labels {
        let kind = match label.kind {
            LabelKind::System => "system",
            LabelKind::User => "user",
        };
        println!("  {} ({kind})", label.name);
    }
}

fn report_column_issues(config: &AppConfig, labels: &[ExternalLabel]) {
    for (index, column) in config.board.columns.iter().enumerate() {
        let validation = validate_column(&config.board.columns, column, Some(index), labels);
        for error in &validation.errors {
            tracing::warn!("column '{}': {error}", column.name);
        }
        if let Some(advisory) = &validation.advisory {
            tracing::info!("column '{}': {advisory}", column.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snooze_hours_accept_only_a_sane_range() {
        assert_eq!(parse_snooze_hours("2"), Ok(2));
        assert_eq!(
            parse_snooze_hours(&MAX_SNOOZE_HOURS.to_string()),
            Ok(MAX_SNOOZE_HOURS)
        );

        assert!(parse_snooze_hours("0").is_err());
        assert!(parse_snooze_hours("-3").is_err());
        assert!(parse_snooze_hours("9999999999999").is_err());
        assert!(parse_snooze_hours("soon").is_err());
    }

    #[test]
    fn longest_snooze_resolves_to_a_valid_timestamp() {
        let now = Utc::now();
        let until = now + Duration::hours(MAX_SNOOZE_HOURS);
        assert!(until > now);
    }
}
