//! Statement builders for the dynamic parts of the repository.
//!
//! Every user-supplied value goes through `push_bind`; only fixed column
//! names are pushed as SQL text.

use sqlx::{Postgres, QueryBuilder};

use crate::models::{ClientFilter, ClientUpdate};

/// Client columns plus the aggregated phone list, grouped per client
const SELECT_CLIENTS: &str = r#"
    SELECT
        c.id,
        c.first_name,
        c.last_name,
        c.email,
        COALESCE(
            array_agg(p.phone_number ORDER BY p.id) FILTER (WHERE p.id IS NOT NULL),
            '{}'
        ) AS phones
    FROM clients c
    LEFT JOIN phones p ON p.client_id = c.id
"#;

const GROUP_AND_ORDER: &str = " GROUP BY c.id ORDER BY c.id ASC";

/// AND-match over the supplied filter fields
pub(crate) fn find_clients(filter: &ClientFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(SELECT_CLIENTS);
    builder.push(" WHERE TRUE");

    if let Some(first_name) = &filter.first_name {
        builder.push(" AND c.first_name = ");
        builder.push_bind(first_name.clone());
    }
    if let Some(last_name) = &filter.last_name {
        builder.push(" AND c.last_name = ");
        builder.push_bind(last_name.clone());
    }
    if let Some(email) = &filter.email {
        builder.push(" AND c.email = ");
        builder.push_bind(email.clone());
    }
    if let Some(phone) = &filter.phone {
        builder.push(
            " AND EXISTS (SELECT 1 FROM phones fp WHERE fp.client_id = c.id AND fp.phone_number = ",
        );
        builder.push_bind(phone.clone());
        builder.push(")");
    }

    builder.push(GROUP_AND_ORDER);
    builder
}

/// OR-match of a single keyword across names, email and phones
pub(crate) fn search_clients(term: &str) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(SELECT_CLIENTS);
    // $1 is referenced by every predicate
    builder.push(" WHERE c.first_name = ");
    builder.push_bind(term.to_owned());
    builder.push(
        " OR c.last_name = $1 OR c.email = $1 \
         OR EXISTS (SELECT 1 FROM phones fp WHERE fp.client_id = c.id AND fp.phone_number = $1)",
    );
    builder.push(GROUP_AND_ORDER);
    builder
}

/// Single client by id
pub(crate) fn client_by_id(id: i32) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(SELECT_CLIENTS);
    builder.push(" WHERE c.id = ");
    builder.push_bind(id);
    builder.push(GROUP_AND_ORDER);
    builder
}

/// `UPDATE clients SET ...` with only the supplied columns
///
/// Returns `None` when the update touches no client column.
pub(crate) fn update_client(
    id: i32,
    update: &ClientUpdate,
) -> Option<QueryBuilder<'static, Postgres>> {
    if !update.has_columns() {
        return None;
    }

    let mut builder = QueryBuilder::new("UPDATE clients SET ");
    {
        let mut columns = builder.separated(", ");
        if let Some(first_name) = &update.first_name {
            columns.push("first_name = ");
            columns.push_bind_unseparated(first_name.clone());
        }
        if let Some(last_name) = &update.last_name {
            columns.push("last_name = ");
            columns.push_bind_unseparated(last_name.clone());
        }
        if let Some(email) = &update.email {
            columns.push("email = ");
            columns.push_bind_unseparated(email.clone());
        }
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING id");
    Some(builder)
}
