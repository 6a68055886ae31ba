//! FortiOS API CLI binary.
//!
//! A command-line interface for interacting with the FortiOS REST API.

use clap::Parser;
use fortiapi::cli::{Cli, Command, PayloadArgs, QueryArgs};
use fortiapi::output::{EntryRow, FieldRow, PrettyPrint, ResourceRow};
use fortiapi::{
    resources, ApiResponse, FortiClient, MovePosition, ResourceClient, ResourceDescriptor, Scope,
};
use serde::Serialize;
use std::process::ExitCode;
use tabled::Table;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    // Metadata commands work without a device.
    match &cli.command {
        Command::Resources => return exit(handle_resources(cli.json)),
        Command::Fields { resource } => return exit(handle_fields(resource, cli.json)),
        _ => {}
    }

    let client = match FortiClient::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Set FORTIOS_HOST and FORTIOS_TOKEN environment variables");
            return ExitCode::FAILURE;
        }
    };

    exit(run(&client, cli).await)
}

fn exit(result: fortiapi::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(client: &FortiClient, cli: Cli) -> fortiapi::Result<()> {
    let scope = cli.scope();
    let json = cli.json;
    let open = |path: &str| bind(client, path, &scope);

    match cli.command {
        Command::Resources => handle_resources(json),
        Command::Fields { resource } => handle_fields(&resource, json),
        Command::Get {
            resource,
            mkey,
            query,
        } => handle_get(&open(&resource)?, mkey.as_deref(), &query, json).await,
        Command::Exists { resource, mkey } => {
            let resource = open(&resource)?;
            let mkey = resource.descriptor().parse_mkey(&mkey);
            let exists = resource.exists(&mkey).await?;
            if json {
                println!("{}", serde_json::json!({ "exists": exists }));
            } else {
                println!("{}", if exists { "exists" } else { "not found" });
            }
            Ok(())
        }
        Command::Set { resource, payload } => handle_set(&open(&resource)?, &payload, json).await,
        Command::Delete { resource, mkey } => {
            let resource = open(&resource)?;
            let mkey = resource.descriptor().parse_mkey(&mkey);
            output_response(&resource.delete(&mkey).await?, json)
        }
        Command::Move {
            resource,
            mkey,
            position,
            reference,
        } => handle_move(&open(&resource)?, &mkey, position, reference.as_deref(), json).await,
        Command::Clone {
            resource,
            mkey,
            new_mkey,
        } => {
            let resource = open(&resource)?;
            let descriptor = resource.descriptor();
            let response = resource
                .clone_to(&descriptor.parse_mkey(&mkey), &descriptor.parse_mkey(&new_mkey))
                .await?;
            output_response(&response, json)
        }
    }
}

fn bind<'a>(
    client: &'a FortiClient,
    path: &str,
    scope: &Scope,
) -> fortiapi::Result<ResourceClient<'a, FortiClient>> {
    Ok(client
        .resource(resources::lookup(path)?)
        .with_scope(scope.clone()))
}

fn handle_resources(json: bool) -> fortiapi::Result<()> {
    if json {
        let all: Vec<&ResourceDescriptor> = resources::ALL.to_vec();
        println!("{}", serde_json::to_string_pretty(&all)?);
    } else {
        let rows: Vec<ResourceRow> = resources::ALL.iter().map(|d| ResourceRow::from(*d)).collect();
        println!("{}", Table::new(rows));
    }
    Ok(())
}

fn handle_fields(resource: &str, json: bool) -> fortiapi::Result<()> {
    let descriptor = resources::lookup(resource)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&descriptor.schema())?);
    } else {
        println!("{}\n", descriptor.pretty_print());
        println!("{}", Table::new(FieldRow::all(descriptor)));
        for table in descriptor.table_fields {
            println!("\n{}: entries keyed by '{}', e.g. {}", table.name, table.mkey, table.example);
        }
    }
    Ok(())
}

async fn handle_get(
    resource: &ResourceClient<'_, FortiClient>,
    mkey: Option<&str>,
    args: &QueryArgs,
    json: bool,
) -> fortiapi::Result<()> {
    let descriptor = resource.descriptor();
    let query = args.to_query(mkey.map(|m| descriptor.parse_mkey(m)));

    let entries = if args.all {
        resource.list_all(&query).await?
    } else {
        resource.get(&query).await?.into_entries()
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.len() == 1 && (mkey.is_some() || descriptor.is_singleton()) {
        output_single(&entries[0])?;
    } else {
        let rows: Vec<EntryRow> = entries.iter().map(|e| EntryRow::new(descriptor, e)).collect();
        println!("{}", Table::new(rows));
        println!("\n{} objects", entries.len());
    }
    Ok(())
}

async fn handle_set(
    resource: &ResourceClient<'_, FortiClient>,
    payload: &PayloadArgs,
    json: bool,
) -> fortiapi::Result<()> {
    let fields = payload.to_fields(resource.descriptor())?;
    let response = resource.set(&fields).await?;
    output_response(&response, json)
}

async fn handle_move(
    resource: &ResourceClient<'_, FortiClient>,
    mkey: &str,
    position: MovePosition,
    reference: Option<&str>,
    json: bool,
) -> fortiapi::Result<()> {
    let descriptor = resource.descriptor();
    let response = resource
        .move_to(
            descriptor.parse_mkey(mkey),
            position,
            reference.map(|r| descriptor.parse_mkey(r)),
        )
        .await?;
    output_response(&response, json)
}

fn output_single<T: Serialize>(item: &T) -> fortiapi::Result<()> {
    println!("{}", serde_json::to_string_pretty(item)?);
    Ok(())
}

fn output_response(response: &ApiResponse, json: bool) -> fortiapi::Result<()> {
    if json {
        output_single(response)
    } else {
        println!("{}", response.pretty_print());
        Ok(())
    }
}
