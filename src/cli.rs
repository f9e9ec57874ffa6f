use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Audit table drift between two database environments", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compare every table in the manifest between the QA and Prod environments
    Compare(CompareArgs),
    /// Validate a table manifest and print the parsed specs
    Manifest(ManifestArgs),
    /// Verify connectivity and credentials for a single environment
    Ping(PingArgs),
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// QA connection URL (jdbc:redshift://host:port/db, postgres://..., or host:port/db)
    #[arg(long = "qa-url")]
    pub qa_url: String,
    /// Prod connection URL
    #[arg(long = "prod-url")]
    pub prod_url: String,
    /// QA user (falls back to the URL, then the QA_USER environment variable)
    #[arg(long = "qa-user")]
    pub qa_user: Option<String>,
    /// Prod user (falls back to the URL, then the PROD_USER environment variable)
    #[arg(long = "prod-user")]
    pub prod_user: Option<String>,
    /// QA password (falls back to the URL, then the QA_PASSWORD environment variable)
    #[arg(long = "qa-password")]
    pub qa_password: Option<String>,
    /// Prod password (falls back to the URL, then the PROD_PASSWORD environment variable)
    #[arg(long = "prod-password")]
    pub prod_password: Option<String>,
    /// Manifest CSV listing `Table Name` and `Key Columns`
    #[arg(short = 'm', long = "manifest")]
    pub manifest: PathBuf,
    /// Schema qualifier for tables without one of their own
    #[arg(long, default_value = "public")]
    pub schema: String,
    /// Directory to receive per-table CSV exports of the one-sided mismatch sets
    #[arg(long = "export-dir")]
    pub export_dir: Option<PathBuf>,
    /// Restrict the run to these manifest tables (repeatable)
    #[arg(long = "table", action = clap::ArgAction::Append)]
    pub tables: Vec<String>,
    /// Mismatch rows echoed per side in the report
    #[arg(long = "preview-rows", default_value_t = 10)]
    pub preview_rows: usize,
    /// Manifest delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
}

#[derive(Debug, Args)]
pub struct ManifestArgs {
    /// Manifest CSV listing `Table Name` and `Key Columns`
    #[arg(short = 'm', long = "manifest")]
    pub manifest: PathBuf,
    /// Manifest delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
}

#[derive(Debug, Args)]
pub struct PingArgs {
    /// Connection URL for the environment to check
    #[arg(long)]
    pub url: String,
    /// User (falls back to the URL, then the DB_USER environment variable)
    #[arg(long)]
    pub user: Option<String>,
    /// Password (falls back to the URL, then the DB_PASSWORD environment variable)
    #[arg(long)]
    pub password: Option<String>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
