use tracing::{info, warn};

use crate::db::Database;
use crate::error::Result;
use crate::models::{ClientFilter, ClientUpdate, NewClient};

/// Sample client the walkthrough creates and removes again
#[derive(Debug, Clone)]
pub struct DemoClient {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub new_email: String,
    pub new_phone: String,
}

impl Default for DemoClient {
    fn default() -> Self {
        Self {
            first_name: "Ivan".to_owned(),
            last_name: "Ivanov".to_owned(),
            email: "ivanov@example.com".to_owned(),
            phone: "+7 999-987-65-43".to_owned(),
            new_email: "ivan.ivanov@example.com".to_owned(),
            new_phone: "+7 901-234-56-78".to_owned(),
        }
    }
}

/// Steps the walkthrough went through, in order
#[derive(Debug, Default)]
pub struct DemoReport {
    pub client_id: i32,
    /// The email was already taken and the existing client was reused
    pub reused_existing: bool,
    pub steps: Vec<String>,
}

impl DemoReport {
    fn step(&mut self, message: String) {
        info!("{message}");
        self.steps.push(message);
    }
}

/// Create the schema, then add, find, change and delete one client
///
/// A duplicate email on the initial insert is not fatal: the existing
/// client is looked up and the walkthrough continues with it.
pub async fn run(db: &Database, sample: &DemoClient) -> Result<DemoReport> {
    let mut report = DemoReport::default();

    db.create_tables().await?;
    report.step("tables ready".to_owned());

    let new_client = NewClient::new(&sample.first_name, &sample.last_name, &sample.email);
    match db.add_client(&new_client).await {
        Ok(id) => report.step(format!("added client {id}")),
        Err(err) if err.is_duplicate_key() => {
            warn!("{err}; continuing with the existing record");
            report.reused_existing = true;
        }
        Err(err) => return Err(err),
    }

    let client_id = db.get_client_id(&sample.email).await?;
    report.client_id = client_id;
    report.step(format!("resolved '{}' to client {client_id}", sample.email));

    db.add_phone(client_id, &sample.phone).await?;
    report.step(format!("added phone {}", sample.phone));

    let matches = db.find_clients(&ClientFilter::by_phone(&sample.phone)).await?;
    report.step(format!("found {} client(s) by phone", matches.len()));

    db.delete_phone(client_id, &sample.phone).await?;
    report.step(format!("deleted phone {}", sample.phone));

    let update = ClientUpdate {
        email: Some(sample.new_email.clone()),
        phones: Some(vec![sample.new_phone.clone()]),
        ..ClientUpdate::default()
    };
    db.update_client(client_id, &update).await?;
    report.step(format!(
        "updated client {client_id}: email {}, phone {}",
        sample.new_email, sample.new_phone
    ));

    db.delete_client(client_id).await?;
    report.step(format!("deleted client {client_id}"));

    Ok(report)
}
