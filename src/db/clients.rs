use tracing::{debug, info};

use super::{query, Database};
use crate::error::{RegistryError, Result};
use crate::models::{Client, ClientFilter, ClientUpdate, NewClient};

impl Database {
    /// Insert a client together with its initial phones
    ///
    /// Fails with `DuplicateKey` when the email is taken; nothing is
    /// committed in that case.
    pub async fn add_client(&self, client: &NewClient) -> Result<i32> {
        client.validate()?;

        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO clients (first_name, last_name, email)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&client.first_name)
        .bind(&client.last_name)
        .bind(&client.email)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| RegistryError::from(err).on_duplicate_email(&client.email))?;

        for number in &client.phones {
            sqlx::query("INSERT INTO phones (client_id, phone_number) VALUES ($1, $2)")
                .bind(id)
                .bind(number)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!(client_id = id, phones = client.phones.len(), "client added");
        Ok(id)
    }

    /// Change only the supplied fields of a client
    ///
    /// A supplied phone list replaces the whole set.
    pub async fn update_client(&self, id: i32, update: &ClientUpdate) -> Result<()> {
        update.validate()?;

        let mut tx = self.pool.begin().await?;

        let found = match query::update_client(id, update) {
            Some(mut statement) => statement
                .build_query_scalar::<i32>()
                .fetch_optional(&mut *tx)
                .await
                .map_err(|err| match &update.email {
                    Some(email) => RegistryError::from(err).on_duplicate_email(email),
                    None => RegistryError::from(err),
                })?
                .is_some(),
            None => {
                sqlx::query_scalar::<_, i32>("SELECT id FROM clients WHERE id = $1 FOR UPDATE")
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?
                    .is_some()
            }
        };

        if !found {
            return Err(RegistryError::NotFound(format!("client {id}")));
        }

        if let Some(phones) = &update.phones {
            let removed = sqlx::query("DELETE FROM phones WHERE client_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            debug!(client_id = id, removed, "replacing phone set");

            for number in phones {
                sqlx::query("INSERT INTO phones (client_id, phone_number) VALUES ($1, $2)")
                    .bind(id)
                    .bind(number)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;

        info!(client_id = id, "client updated");
        Ok(())
    }

    /// Delete a client and every phone it owns in one transaction
    pub async fn delete_client(&self, id: i32) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let phones = sqlx::query("DELETE FROM phones WHERE client_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(RegistryError::NotFound(format!("client {id}")));
        }

        tx.commit().await?;

        info!(client_id = id, phones, "client deleted");
        Ok(())
    }

    pub async fn get_client(&self, id: i32) -> Result<Client> {
        query::client_by_id(id)
            .build_query_as::<Client>()
            .fetch_optional(self.get_pool())
            .await?
            .ok_or_else(|| RegistryError::NotFound(format!("client {id}")))
    }

    /// Clients matching every supplied filter field, ordered by id
    pub async fn find_clients(&self, filter: &ClientFilter) -> Result<Vec<Client>> {
        let clients = query::find_clients(filter)
            .build_query_as::<Client>()
            .fetch_all(self.get_pool())
            .await?;

        debug!(matches = clients.len(), "find_clients");
        Ok(clients)
    }

    /// Clients whose first name, last name, email or any phone equals `term`
    pub async fn search_clients(&self, term: &str) -> Result<Vec<Client>> {
        let clients = query::search_clients(term)
            .build_query_as::<Client>()
            .fetch_all(self.get_pool())
            .await?;

        debug!(term, matches = clients.len(), "search_clients");
        Ok(clients)
    }

    /// Id of the first client matching a keyword search
    pub async fn get_client_id(&self, term: &str) -> Result<i32> {
        self.search_clients(term)
            .await?
            .first()
            .map(|client| client.id)
            .ok_or_else(|| RegistryError::NotFound(format!("no client matches '{term}'")))
    }
}

#[cfg(test)]
mod tests {
    use crate::db::test_support::{connect, unique_email};
    use crate::error::RegistryError;
    use crate::models::{ClientFilter, ClientUpdate, NewClient};

    #[tokio::test]
    #[ignore = "requires database"]
    async fn add_then_find_round_trip() {
        let db = connect().await;
        let email = unique_email("roundtrip");

        let id = db.add_client(&NewClient::new("A", "B", &email)).await.unwrap();
        let found = db.find_clients(&ClientFilter::by_email(&email)).await.unwrap();

        assert_eq!(found.len(), 1);
        let client = &found[0];
        assert_eq!(client.id, id);
        assert_eq!(client.first_name, "A");
        assert_eq!(client.last_name, "B");
        assert_eq!(client.email, email);
        assert!(client.phones.is_empty());

        db.delete_client(id).await.unwrap();
        db.close().await;
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn ids_strictly_increase() {
        let db = connect().await;

        let first = db
            .add_client(&NewClient::new("A", "One", &unique_email("inc")))
            .await
            .unwrap();
        let second = db
            .add_client(&NewClient::new("A", "Two", &unique_email("inc")))
            .await
            .unwrap();
        assert!(second > first);

        db.delete_client(first).await.unwrap();
        db.delete_client(second).await.unwrap();
        db.close().await;
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_email_is_reported_and_original_kept() {
        let db = connect().await;
        let email = unique_email("dup");

        let id = db
            .add_client(&NewClient::new("Ivan", "Ivanov", &email).with_phone("+1-555-0101"))
            .await
            .unwrap();
        let err = db
            .add_client(&NewClient::new("Petr", "Petrov", &email).with_phone("+1-555-0102"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateKey { .. }));
        assert!(err.to_string().contains(&email));

        let client = db.get_client(id).await.unwrap();
        assert_eq!(client.first_name, "Ivan");
        assert_eq!(client.last_name, "Ivanov");
        assert_eq!(client.phones, vec!["+1-555-0101".to_string()]);

        // the rolled-back insert left no orphan phone behind
        assert!(db
            .find_clients(&ClientFilter::by_phone("+1-555-0102"))
            .await
            .unwrap()
            .iter()
            .all(|c| c.email != email));

        db.delete_client(id).await.unwrap();
        db.close().await;
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn partial_update_leaves_other_fields() {
        let db = connect().await;
        let email = unique_email("partial");
        let id = db
            .add_client(
                &NewClient::new("Ivan", "Ivanov", &email)
                    .with_phone("+1-555-0110")
                    .with_phone("+1-555-0111"),
            )
            .await
            .unwrap();

        let new_email = unique_email("partial-new");
        db.update_client(
            id,
            &ClientUpdate {
                email: Some(new_email.clone()),
                ..ClientUpdate::default()
            },
        )
        .await
        .unwrap();

        let found = db.find_clients(&ClientFilter::by_email(&new_email)).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, id);
        assert_eq!(found[0].first_name, "Ivan");
        assert_eq!(found[0].last_name, "Ivanov");
        assert_eq!(found[0].phones, vec!["+1-555-0110", "+1-555-0111"]);
        assert!(db.find_clients(&ClientFilter::by_email(&email)).await.unwrap().is_empty());

        db.delete_client(id).await.unwrap();
        db.close().await;
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn update_replaces_phone_set() {
        let db = connect().await;
        let id = db
            .add_client(
                &NewClient::new("Ivan", "Ivanov", &unique_email("phones")).with_phone("+1-555-0120"),
            )
            .await
            .unwrap();

        db.update_client(
            id,
            &ClientUpdate {
                phones: Some(vec!["+1-555-0121".into(), "+1-555-0122".into()]),
                ..ClientUpdate::default()
            },
        )
        .await
        .unwrap();

        let client = db.get_client(id).await.unwrap();
        assert_eq!(client.phones, vec!["+1-555-0121", "+1-555-0122"]);
        assert_eq!(client.first_name, "Ivan");

        db.delete_client(id).await.unwrap();
        db.close().await;
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn update_to_taken_email_is_duplicate() {
        let db = connect().await;
        let taken = unique_email("taken");
        let a = db.add_client(&NewClient::new("A", "A", &taken)).await.unwrap();
        let b = db
            .add_client(&NewClient::new("B", "B", &unique_email("other")))
            .await
            .unwrap();

        let err = db
            .update_client(
                b,
                &ClientUpdate {
                    email: Some(taken.clone()),
                    ..ClientUpdate::default()
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_duplicate_key());

        db.delete_client(a).await.unwrap();
        db.delete_client(b).await.unwrap();
        db.close().await;
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn update_unknown_client_is_not_found() {
        let db = connect().await;
        let err = db
            .update_client(
                -1,
                &ClientUpdate {
                    first_name: Some("Nobody".into()),
                    ..ClientUpdate::default()
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = db
            .update_client(
                -1,
                &ClientUpdate {
                    phones: Some(Vec::new()),
                    ..ClientUpdate::default()
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        db.close().await;
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn delete_cascades_to_phones_and_hides_client() {
        let db = connect().await;
        let email = unique_email("cascade");
        let id = db
            .add_client(&NewClient::new("Cascade", "Client", &email).with_phone("+1-555-0130"))
            .await
            .unwrap();

        db.delete_client(id).await.unwrap();

        assert!(db.find_clients(&ClientFilter::by_email(&email)).await.unwrap().is_empty());
        assert!(db.search_clients(&email).await.unwrap().is_empty());
        assert!(db.list_phones(id).await.unwrap().is_empty());
        assert!(db.get_client(id).await.unwrap_err().is_not_found());
        assert!(db.delete_client(id).await.unwrap_err().is_not_found());
        db.close().await;
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn search_matches_any_attribute() {
        let db = connect().await;
        let email = unique_email("search");
        let id = db
            .add_client(&NewClient::new("Ivan", "Ivanov", &email))
            .await
            .unwrap();
        db.add_phone(id, "+1-555-0100").await.unwrap();

        assert_eq!(db.get_client_id(&email).await.unwrap(), id);
        let by_phone = db.find_clients(&ClientFilter::by_phone("+1-555-0100")).await.unwrap();
        assert!(by_phone.iter().any(|c| c.id == id));
        let by_keyword = db.search_clients("+1-555-0100").await.unwrap();
        assert!(by_keyword.iter().any(|c| c.id == id));

        db.delete_client(id).await.unwrap();
        db.close().await;
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn get_client_id_without_match_is_not_found() {
        let db = connect().await;
        let err = db.get_client_id("nonexistent@x.ru").await.unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(_)));
        db.close().await;
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn invalid_input_never_reaches_storage() {
        let db = connect().await;
        let err = db.add_client(&NewClient::new("", "B", "a@b.com")).await.unwrap_err();
        assert!(matches!(err, RegistryError::Validation { field: "first_name", .. }));
        db.close().await;
    }
}
