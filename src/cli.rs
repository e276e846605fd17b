use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Manage client records and their phone numbers in PostgreSQL
#[derive(Parser, Debug)]
#[command(name = "client_manager", version, about)]
pub struct Cli {
    /// Read connection settings from this file instead of ./.env
    #[arg(long, global = true, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the clients and phones tables if missing
    Init,
    /// Drop and recreate both tables
    Reset,
    /// Add a new client
    Add(AddArgs),
    /// Attach a phone number to a client
    AddPhone {
        /// Client id
        client_id: i32,
        /// Phone number to add
        number: String,
    },
    /// Change only the given fields of a client
    Update(UpdateArgs),
    /// Remove one phone number from a client
    DeletePhone {
        /// Client id
        client_id: i32,
        /// Exact phone number to remove
        number: String,
    },
    /// Remove every phone number of a client
    DeletePhones {
        /// Client id
        client_id: i32,
    },
    /// Delete a client together with its phones
    Delete {
        /// Client id
        client_id: i32,
    },
    /// Find clients matching all given fields
    Find(FilterArgs),
    /// Find clients whose name, email or phone equals a keyword
    Search {
        /// Keyword to match
        term: String,
    },
    /// Print the id of the first client matching a keyword
    Id {
        /// Keyword to match
        term: String,
    },
    /// Show one client
    Show {
        /// Client id
        client_id: i32,
    },
    /// Run the end-to-end walkthrough (default)
    Demo,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// First name
    #[arg(long)]
    pub first_name: String,
    /// Last name
    #[arg(long)]
    pub last_name: String,
    /// Email address, must be unique
    #[arg(long)]
    pub email: String,
    /// Phone number (repeatable)
    #[arg(long = "phone", value_name = "NUMBER")]
    pub phones: Vec<String>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Client id
    pub client_id: i32,
    /// New first name
    #[arg(long)]
    pub first_name: Option<String>,
    /// New last name
    #[arg(long)]
    pub last_name: Option<String>,
    /// New email address
    #[arg(long)]
    pub email: Option<String>,
    /// Replace the phone set with these numbers (repeatable)
    #[arg(long = "phone", value_name = "NUMBER", conflicts_with = "clear_phones")]
    pub phones: Vec<String>,
    /// Remove every phone number
    #[arg(long)]
    pub clear_phones: bool,
}

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Match first name exactly
    #[arg(long)]
    pub first_name: Option<String>,
    /// Match last name exactly
    #[arg(long)]
    pub last_name: Option<String>,
    /// Match email exactly
    #[arg(long)]
    pub email: Option<String>,
    /// Match any phone number exactly
    #[arg(long)]
    pub phone: Option<String>,
}
