use crate::error::{RegistryError, Result};

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Phone {
    pub id: i32,
    pub client_id: i32,
    pub phone_number: String,
}

/// Reject blank phone numbers before they reach storage
pub(crate) fn validate_number(number: &str) -> Result<()> {
    if number.trim().is_empty() {
        return Err(RegistryError::validation(
            "phone_number",
            "must not be empty",
        ));
    }
    Ok(())
}
