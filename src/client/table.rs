//! Typed CRUD against one table.

use std::marker::PhantomData;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{ClientError, Query, SupabaseClient};
use crate::schema::Table;

const PREFER_REPRESENTATION: (&str, &str) = ("Prefer", "return=representation");

/// Borrowed view of a [`SupabaseClient`] bound to table `T`.
pub struct TableClient<'a, T: Table> {
    client: &'a SupabaseClient,
    _table: PhantomData<T>,
}

impl<'a, T: Table> TableClient<'a, T> {
    pub(super) fn new(client: &'a SupabaseClient) -> Self {
        Self { client, _table: PhantomData }
    }

    /// All rows matching `query`.
    pub async fn select(&self, query: &Query) -> Result<Vec<T::Row>, ClientError> {
        debug!(table = T::NAME, params = ?query.params(), "select");
        let response = self.client.send(self.select_request(query), "select").await?;
        decode::<Vec<T::Row>>(response).await
    }

    /// The row whose primary key equals `id`, if any.
    pub async fn get(&self, id: &str) -> Result<Option<T::Row>, ClientError> {
        let query = Query::new().eq(T::PRIMARY_KEY, id).limit(1);
        Ok(self.select(&query).await?.into_iter().next())
    }

    /// Insert one row and return it as stored (server defaults applied).
    pub async fn insert(&self, row: &T::Insert) -> Result<T::Row, ClientError> {
        debug!(table = T::NAME, "insert");
        let response = self.client.send(self.insert_request(row), "insert").await?;
        decode::<Vec<T::Row>>(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::Decode("insert returned no representation".into()))
    }

    /// Patch the row with primary key `id`. `None` when nothing matched.
    pub async fn update(&self, id: &str, patch: &T::Update) -> Result<Option<T::Row>, ClientError> {
        debug!(table = T::NAME, id, "update");
        let response = self.client.send(self.update_request(id, patch), "update").await?;
        Ok(decode::<Vec<T::Row>>(response).await?.into_iter().next())
    }

    /// Delete the row with primary key `id`. `true` when a row was removed.
    pub async fn delete(&self, id: &str) -> Result<bool, ClientError> {
        debug!(table = T::NAME, id, "delete");
        let response = self.client.send(self.delete_request(id), "delete").await?;
        // Only the count matters; skip decoding into the row type.
        let removed = decode::<Vec<serde_json::Value>>(response).await?;
        Ok(!removed.is_empty())
    }

    // ── request builders ─────────────────────────────────────────────────────

    pub(crate) fn select_request(&self, query: &Query) -> RequestBuilder {
        self.client
            .request(Method::GET, T::NAME)
            .query(&[("select", "*")])
            .query(&query.params())
    }

    pub(crate) fn insert_request(&self, row: &T::Insert) -> RequestBuilder {
        self.client
            .request(Method::POST, T::NAME)
            .header(PREFER_REPRESENTATION.0, PREFER_REPRESENTATION.1)
            .json(row)
    }

    pub(crate) fn update_request(&self, id: &str, patch: &T::Update) -> RequestBuilder {
        self.client
            .request(Method::PATCH, T::NAME)
            .query(&[(T::PRIMARY_KEY, format!("eq.{id}"))])
            .header(PREFER_REPRESENTATION.0, PREFER_REPRESENTATION.1)
            .json(patch)
    }

    pub(crate) fn delete_request(&self, id: &str) -> RequestBuilder {
        self.client
            .request(Method::DELETE, T::NAME)
            .query(&[(T::PRIMARY_KEY, format!("eq.{id}"))])
            .header(PREFER_REPRESENTATION.0, PREFER_REPRESENTATION.1)
    }
}

async fn decode<R: DeserializeOwned>(response: Response) -> Result<R, ClientError> {
    response
        .json::<R>()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}
