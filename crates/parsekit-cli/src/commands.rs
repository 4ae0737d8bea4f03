use std::time::Duration;

use anyhow::{bail, Context};
use colored::Colorize;
use parsekit_sdk::{
    BackendKind, Client, ClientConfig, Fields, ParseObject, ParseUser, Query, RestConfig,
};
use serde_json::json;
use tracing::debug;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli.connection)?;
    debug!(backend = %config.backend, "resolved configuration");
    let client = Client::from_config(&config)?;
    match cli.command {
        Command::Save(args) => cmd_save(&client, args, &cli.format).await,
        Command::Find(args) => cmd_find(&client, args, &cli.format).await,
        Command::Delete(args) => cmd_delete(&client, args, &cli.format).await,
        Command::Signup(args) => cmd_signup(&client, args, &cli.format).await,
    }
}

/// Load `--config` if given, then apply connection flags on top.
///
/// Only the REST backend is reachable from the command line: store
/// backends need a driver linked into the program.
pub fn resolve_config(conn: &ConnectionArgs) -> anyhow::Result<ClientConfig> {
    let mut config = match &conn.config {
        Some(path) => ClientConfig::read_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ClientConfig::default(),
    };
    if config.backend != BackendKind::Rest {
        bail!(
            "the {} backend is not available from the command line; set backend = \"rest\"",
            config.backend
        );
    }

    let rest = config.rest.get_or_insert_with(RestConfig::default);
    if let Some(url) = &conn.server_url {
        rest.base_url = url.clone();
    }
    if let Some(app_id) = &conn.app_id {
        rest.application_id = app_id.clone();
    }
    if let Some(key) = &conn.rest_key {
        rest.rest_api_key = key.clone();
    }
    if let Some(secs) = conn.timeout {
        rest.timeout = Duration::from_secs(secs);
    }

    config.validate()?;
    Ok(config)
}

fn fields_of(pairs: Vec<(String, serde_json::Value)>) -> Fields {
    pairs.into_iter().collect()
}

pub fn build_query(args: &FindArgs) -> Query {
    let mut query = Query::new(&args.class)
        .with_limit(args.limit)
        .with_skip(args.skip);
    for (key, value) in &args.constraints {
        query = query.equal_to(key.clone(), value.clone());
    }
    if let Some(order) = &args.order {
        query = query.with_order(order.clone());
    }
    if let Some(keys) = &args.keys {
        query = query.with_keys(keys.clone());
    }
    if let Some(include) = &args.include {
        query = query.with_include(include.clone());
    }
    query
}

async fn cmd_save(client: &Client, args: SaveArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let fields = fields_of(args.fields);
    let mut object = match args.id {
        Some(id) => ParseObject::with_id(args.class, id, fields),
        None => ParseObject::new(args.class, fields),
    };
    let creating = object.is_new();
    client.save(&mut object).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&object)?),
        OutputFormat::Text => {
            let verb = if creating { "Created" } else { "Updated" };
            println!(
                "{} {} {} {}",
                "✓".green().bold(),
                verb,
                object.class_name().bold(),
                object.object_id().to_string().yellow()
            );
            if let Some(ts) = object.updated_at() {
                println!("  At: {}", ts.to_rfc3339().dimmed());
            }
        }
    }
    Ok(())
}

async fn cmd_find(client: &Client, args: FindArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let query = build_query(&args);
    let objects = client.find(&query).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&objects)?),
        OutputFormat::Text => {
            if objects.is_empty() {
                println!("No {} objects found.", args.class.bold());
                return Ok(());
            }
            for object in &objects {
                println!(
                    "{}  {}",
                    object.object_id().to_string().yellow(),
                    serde_json::to_string(object.fields())?
                );
            }
            println!("{} {} object(s)", objects.len().to_string().bold(), args.class);
        }
    }
    Ok(())
}

async fn cmd_delete(client: &Client, args: DeleteArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let object = ParseObject::with_id(args.class, args.id, Fields::new());
    client.delete(&object).await?;

    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({
                "deleted": true,
                "className": object.class_name(),
                "objectId": object.object_id(),
            })
        ),
        OutputFormat::Text => println!(
            "{} Deleted {} {}",
            "✓".green().bold(),
            object.class_name().bold(),
            object.object_id().to_string().yellow()
        ),
    }
    Ok(())
}

async fn cmd_signup(client: &Client, args: SignupArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let mut user = ParseUser::new(args.username, args.password, args.email.unwrap_or_default());
    client.sign_up(&mut user).await?;

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "objectId": user.object_id(),
                "username": user.username(),
                "createdAt": user.object().created_at(),
                "sessionToken": user.session_token(),
            }))?
        ),
        OutputFormat::Text => {
            println!(
                "{} Signed up {} ({})",
                "✓".green().bold(),
                user.username().bold(),
                user.object_id().to_string().yellow()
            );
            if let Some(token) = user.session_token() {
                println!("  Session: {}", token.cyan());
            }
        }
    }
    Ok(())
}
