use anyhow::Result;

use client_manager::demo::{self, DemoClient};
use client_manager::models::{Client, ClientFilter, ClientUpdate, NewClient};
use client_manager::Database;

use crate::cli::{AddArgs, Command, FilterArgs, UpdateArgs};

/// Execute one subcommand against an open database
pub async fn run(db: &Database, command: Command) -> Result<()> {
    match command {
        Command::Init => {
            db.create_tables().await?;
            println!("Tables ready");
        }
        Command::Reset => {
            db.drop_tables().await?;
            db.create_tables().await?;
            println!("Tables recreated");
        }
        Command::Add(args) => {
            let id = db.add_client(&new_client(args)).await?;
            println!("Added client {id}");
        }
        Command::AddPhone { client_id, number } => {
            let phone = db.add_phone(client_id, &number).await?;
            println!("Added phone {} to client {}", phone.phone_number, phone.client_id);
        }
        Command::Update(args) => {
            let client_id = args.client_id;
            db.update_client(client_id, &client_update(args)).await?;
            println!("Updated client {client_id}");
        }
        Command::DeletePhone { client_id, number } => {
            let removed = db.delete_phone(client_id, &number).await?;
            println!("Removed {removed} phone(s) from client {client_id}");
        }
        Command::DeletePhones { client_id } => {
            let removed = db.delete_phones(client_id).await?;
            println!("Removed {removed} phone(s) from client {client_id}");
        }
        Command::Delete { client_id } => {
            db.delete_client(client_id).await?;
            println!("Deleted client {client_id}");
        }
        Command::Find(args) => {
            print_clients(&db.find_clients(&client_filter(args)).await?);
        }
        Command::Search { term } => {
            print_clients(&db.search_clients(&term).await?);
        }
        Command::Id { term } => {
            println!("{}", db.get_client_id(&term).await?);
        }
        Command::Show { client_id } => {
            print_clients(&[db.get_client(client_id).await?]);
        }
        Command::Demo => {
            let report = demo::run(db, &DemoClient::default()).await?;
            for step in &report.steps {
                println!("- {step}");
            }
        }
    }

    Ok(())
}

fn new_client(args: AddArgs) -> NewClient {
    NewClient {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        phones: args.phones,
    }
}

fn client_update(args: UpdateArgs) -> ClientUpdate {
    let phones = if args.clear_phones {
        Some(Vec::new())
    } else if args.phones.is_empty() {
        None
    } else {
        Some(args.phones)
    };

    ClientUpdate {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        phones,
    }
}

fn client_filter(args: FilterArgs) -> ClientFilter {
    ClientFilter {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        phone: args.phone,
    }
}

fn print_clients(clients: &[Client]) {
    if clients.is_empty() {
        println!("No clients found");
        return;
    }

    for client in clients {
        let phones = if client.phones.is_empty() {
            "-".to_owned()
        } else {
            client.phones.join(", ")
        };
        println!(
            "{:>5}  {} {} <{}>  phones: {}",
            client.id, client.first_name, client.last_name, client.email, phones
        );
    }
}
