use tracing::info;

use super::Database;
use crate::error::{RegistryError, Result};
use crate::models::{validate_number, Phone};

impl Database {
    /// Attach another phone number to a client
    pub async fn add_phone(&self, client_id: i32, number: &str) -> Result<Phone> {
        validate_number(number)?;

        let phone = sqlx::query_as::<_, Phone>(
            r#"
            INSERT INTO phones (client_id, phone_number)
            VALUES ($1, $2)
            RETURNING id, client_id, phone_number
            "#,
        )
        .bind(client_id)
        .bind(number)
        .fetch_one(self.get_pool())
        .await
        .map_err(|err| match RegistryError::from(err) {
            RegistryError::ReferentialConflict { .. } => {
                RegistryError::NotFound(format!("client {client_id}"))
            }
            other => other,
        })?;

        info!(client_id, phone_id = phone.id, "phone added");
        Ok(phone)
    }

    /// Remove the phones of a client that exactly match `number`
    pub async fn delete_phone(&self, client_id: i32, number: &str) -> Result<u64> {
        let removed = sqlx::query("DELETE FROM phones WHERE client_id = $1 AND phone_number = $2")
            .bind(client_id)
            .bind(number)
            .execute(self.get_pool())
            .await?
            .rows_affected();

        if removed == 0 {
            return Err(RegistryError::NotFound(format!(
                "phone '{number}' for client {client_id}"
            )));
        }

        info!(client_id, removed, "phone deleted");
        Ok(removed)
    }

    /// Remove every phone of a client
    pub async fn delete_phones(&self, client_id: i32) -> Result<u64> {
        let removed = sqlx::query("DELETE FROM phones WHERE client_id = $1")
            .bind(client_id)
            .execute(self.get_pool())
            .await?
            .rows_affected();

        info!(client_id, removed, "phones deleted");
        Ok(removed)
    }

    /// Phone rows of a client, oldest first
    pub async fn list_phones(&self, client_id: i32) -> Result<Vec<Phone>> {
        let phones = sqlx::query_as::<_, Phone>(
            "SELECT id, client_id, phone_number FROM phones WHERE client_id = $1 ORDER BY id ASC",
        )
        .bind(client_id)
        .fetch_all(self.get_pool())
        .await?;

        Ok(phones)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::test_support::{connect, unique_email};
    use crate::error::RegistryError;
    use crate::models::{ClientFilter, NewClient};

    #[tokio::test]
    #[ignore = "requires database"]
    async fn phones_accumulate_per_client() {
        let db = connect().await;
        let id = db
            .add_client(&NewClient::new("Ivan", "Ivanov", &unique_email("multi")))
            .await
            .unwrap();

        let first = db.add_phone(id, "+1-555-0200").await.unwrap();
        let second = db.add_phone(id, "+1-555-0201").await.unwrap();
        assert_eq!(first.client_id, id);
        assert!(second.id > first.id);

        let numbers: Vec<String> = db
            .list_phones(id)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.phone_number)
            .collect();
        assert_eq!(numbers, vec!["+1-555-0200", "+1-555-0201"]);

        db.delete_client(id).await.unwrap();
        db.close().await;
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn delete_phone_matches_exact_number() {
        let db = connect().await;
        let id = db
            .add_client(
                &NewClient::new("Ivan", "Ivanov", &unique_email("delphone"))
                    .with_phone("+1-555-0210")
                    .with_phone("+1-555-0211"),
            )
            .await
            .unwrap();

        assert_eq!(db.delete_phone(id, "+1-555-0210").await.unwrap(), 1);
        let err = db.delete_phone(id, "+1-555-0210").await.unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(_)));

        let client = db.get_client(id).await.unwrap();
        assert_eq!(client.phones, vec!["+1-555-0211"]);

        db.delete_client(id).await.unwrap();
        db.close().await;
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn deleting_all_phones_leaves_empty_list() {
        let db = connect().await;
        let email = unique_email("nophones");
        let id = db
            .add_client(
                &NewClient::new("Ivan", "Ivanov", &email)
                    .with_phone("+1-555-0220")
                    .with_phone("+1-555-0221"),
            )
            .await
            .unwrap();

        assert_eq!(db.delete_phones(id).await.unwrap(), 2);
        assert_eq!(db.delete_phones(id).await.unwrap(), 0);

        assert!(db.list_phones(id).await.unwrap().is_empty());
        let found = db.find_clients(&ClientFilter::by_email(&email)).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].phones.is_empty());

        db.delete_client(id).await.unwrap();
        db.close().await;
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn phone_for_unknown_client_is_not_found() {
        let db = connect().await;
        let err = db.add_phone(-1, "+1-555-0230").await.unwrap_err();
        assert!(err.is_not_found());
        db.close().await;
    }
}
