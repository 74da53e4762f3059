pub mod client;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use client::ApiClient;

#[derive(Parser)]
#[command(name = "datadock")]
#[command(about = "Datadock CLI - client for the document ingestion and query API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "API server base URL (default: http://localhost:8080)")]
    pub server: Option<String>,

    #[arg(long, global = true, help = "Session token for protected commands (or DATADOCK_TOKEN)")]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Check server health")]
    Health,

    #[command(about = "Register a new user account")]
    Register {
        username: String,
        password: String,
    },

    #[command(about = "Authenticate and print a session token")]
    Login {
        username: String,
        password: String,
    },

    #[command(about = "Upload a CSV or JSON file of records")]
    Upload {
        #[arg(help = "Path to the .csv or .json file")]
        file: PathBuf,
        #[arg(long = "record-type", help = "Tag partitioning your records, e.g. sales")]
        record_type: String,
    },

    #[command(about = "List your record types")]
    Types,

    #[command(about = "List discovered fields for a record type")]
    Fields {
        #[arg(long = "record-type")]
        record_type: String,
    },

    #[command(about = "Aggregate a numeric field (sum, average, min, max)")]
    Aggregate {
        #[arg(long = "record-type")]
        record_type: String,
        #[arg(long)]
        field: String,
        #[arg(long)]
        op: String,
    },

    #[command(about = "List your stored records, optionally bounded by date")]
    Data {
        #[arg(long, help = "Inclusive lower bound, YYYY-MM-DD")]
        from: Option<String>,
        #[arg(long, help = "Inclusive upper bound, YYYY-MM-DD")]
        to: Option<String>,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let server = cli
        .server
        .or_else(|| std::env::var("DATADOCK_SERVER").ok())
        .unwrap_or_else(|| "http://localhost:8080".to_string());
    let token = cli.token.or_else(|| std::env::var("DATADOCK_TOKEN").ok());

    let client = ApiClient::new(server, token);

    let output = match cli.command {
        Commands::Health => client.health().await?,
        Commands::Register { username, password } => client.register(&username, &password).await?,
        Commands::Login { username, password } => client.login(&username, &password).await?,
        Commands::Upload { file, record_type } => client.upload(&file, &record_type).await?,
        Commands::Types => client.record_types().await?,
        Commands::Fields { record_type } => client.fields(&record_type).await?,
        Commands::Aggregate { record_type, field, op } => {
            client.aggregate(&record_type, &field, &op).await?
        }
        Commands::Data { from, to } => {
            client.user_data(from.as_deref(), to.as_deref()).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
