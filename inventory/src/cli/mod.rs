//! CLI module for asset-inventory
//!
//! Provides the command-line interface of the inventory server.

pub mod serve;

use clap::{Parser, Subcommand};

/// Asset inventory server - departments, employees, categories and assets behind role-based access
#[derive(Parser, Debug)]
#[command(name = "asset-inventory")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    INVENTORY_HOST            Bind address (default: 0.0.0.0)
    INVENTORY_PORT            Listen port (default: 8000)
    INVENTORY_LOG_LEVEL       Log filter (default: info)
    INVENTORY_LOG_DIR         Directory for daily rotated log files
    INVENTORY_DATA_DIR        Data directory (default: ~/.asset-inventory)
    INVENTORY_DATABASE_URL    Database URL
    INVENTORY_JWT_SECRET      JWT signing key (auto-generated if not set)
    INVENTORY_ADMIN_EMAIL     Initial admin email (default: admin@example.com)
    INVENTORY_ADMIN_NAME      Initial admin name (default: Administrator)
    INVENTORY_ADMIN_PASSWORD  Initial admin password (prompted on first run if unset)
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the inventory server
    Serve(serve::ServeArgs),
}
