use crate::error::{RegistryError, Result};
use crate::models::phone::validate_number;

/// A client as read back from storage, with every phone number it owns
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phones: Vec<String>,
}

/// Input for creating a client
#[derive(Debug, Clone, Default)]
pub struct NewClient {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phones: Vec<String>,
}

impl NewClient {
    pub fn new(first_name: &str, last_name: &str, email: &str) -> Self {
        Self {
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            email: email.to_owned(),
            phones: Vec::new(),
        }
    }

    pub fn with_phone(mut self, number: &str) -> Self {
        self.phones.push(number.to_owned());
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_name("first_name", &self.first_name)?;
        validate_name("last_name", &self.last_name)?;
        validate_email(&self.email)?;
        for number in &self.phones {
            validate_number(number)?;
        }
        Ok(())
    }
}

/// Partial update; `None` leaves the column untouched
///
/// `phones` replaces the client's whole phone set when present.
#[derive(Debug, Clone, Default)]
pub struct ClientUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phones: Option<Vec<String>>,
}

impl ClientUpdate {
    /// True when no client column is touched
    pub fn has_columns(&self) -> bool {
        self.first_name.is_some() || self.last_name.is_some() || self.email.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_columns() && self.phones.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(RegistryError::validation(
                "update",
                "at least one field must be supplied",
            ));
        }
        if let Some(first_name) = &self.first_name {
            validate_name("first_name", first_name)?;
        }
        if let Some(last_name) = &self.last_name {
            validate_name("last_name", last_name)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(phones) = &self.phones {
            for number in phones {
                validate_number(number)?;
            }
        }
        Ok(())
    }
}

/// Structured search: every supplied field must match exactly
#[derive(Debug, Clone, Default)]
pub struct ClientFilter {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    /// Matches when any of the client's phones equals this number
    pub phone: Option<String>,
}

impl ClientFilter {
    pub fn by_email(email: &str) -> Self {
        Self {
            email: Some(email.to_owned()),
            ..Self::default()
        }
    }

    pub fn by_phone(number: &str) -> Self {
        Self {
            phone: Some(number.to_owned()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
    }
}

fn validate_name(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RegistryError::validation(field, "must not be empty"));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(RegistryError::validation("email", "must not be empty"));
    }
    if !email.contains('@') {
        return Err(RegistryError::validation("email", format!("'{email}' has no '@'")));
    }
    Ok(())
}
