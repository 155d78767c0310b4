//! CLI module - Command-line interface for Motofleet
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

pub use commands::{cmd_create_user, cmd_hash_password};

use clap::{Parser, Subcommand};

/// Motofleet - fleet management REST API
#[derive(Parser)]
#[command(name = "motofleet")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server (default)
    Serve,

    /// Provision a user directly against the database
    CreateUser {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// Role name, e.g. ADMIN or USER
        #[arg(long, default_value = "ADMIN")]
        role: String,
    },

    /// Print a bcrypt hash for a plaintext password
    HashPassword {
        password: String,
    },
}
