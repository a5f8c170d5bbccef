use crate::core::error::StoreError;
use crate::core::store::{RowStore, Table};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Row store backed by a PostgREST-style HTTP API, as exposed by hosted
/// backend-as-a-service platforms.
pub struct RestRowStore {
    base_url: String,
    api_key: String,
    client: Client,
}

impl RestRowStore {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, StoreError> {
        let client = Client::builder().user_agent("moneymap/1.0").build()?;
        Ok(RestRowStore {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.name())
    }

    fn filtered_url(&self, table: Table, column: &str, value: Uuid) -> String {
        format!("{}?{}=eq.{}", self.table_url(table), column, value)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    fn check_status(table: Table, response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status {
                status,
                table: table.name(),
            });
        }
        Ok(response)
    }

    async fn returned_rows(table: Table, response: Response) -> Result<Vec<Value>, StoreError> {
        let response = Self::check_status(table, response)?;
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| StoreError::Malformed {
                table: table.name(),
                reason: format!("Failed to parse JSON response: {e}"),
            })
    }
}

#[async_trait]
impl RowStore for RestRowStore {
    #[instrument(name = "RestSelect", skip(self), fields(table = %table, owner = %owner))]
    async fn select(&self, table: Table, owner: Uuid) -> Result<Vec<Value>, StoreError> {
        let url = format!(
            "{}&select=*",
            self.filtered_url(table, table.owner_column(), owner)
        );
        debug!("Requesting rows from {}", url);
        let response = self.authorized(self.client.get(&url)).send().await?;
        Self::returned_rows(table, response).await
    }

    #[instrument(name = "RestInsert", skip(self, row), fields(table = %table))]
    async fn insert(&self, table: Table, row: Value) -> Result<(), StoreError> {
        let url = self.table_url(table);
        debug!("Inserting row into {}", url);
        let response = self
            .authorized(self.client.post(&url))
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await?;
        Self::check_status(table, response)?;
        Ok(())
    }

    #[instrument(name = "RestUpdate", skip(self, row), fields(table = %table, owner = %owner))]
    async fn update(&self, table: Table, owner: Uuid, row: Value) -> Result<(), StoreError> {
        let url = self.filtered_url(table, table.owner_column(), owner);
        debug!("Updating rows at {}", url);
        let response = self
            .authorized(self.client.patch(&url))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        let updated = Self::returned_rows(table, response).await?;
        if updated.is_empty() {
            return Err(StoreError::NotFound {
                table: table.name(),
                key: owner,
            });
        }
        Ok(())
    }

    #[instrument(name = "RestDelete", skip(self), fields(table = %table, key = %key))]
    async fn delete(&self, table: Table, key: Uuid) -> Result<bool, StoreError> {
        let url = self.filtered_url(table, table.key_column(), key);
        debug!("Deleting rows at {}", url);
        let response = self
            .authorized(self.client.delete(&url))
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let deleted = Self::returned_rows(table, response).await?;
        Ok(!deleted.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Category, Collection, Period};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn savings() -> Table {
        Table::Expenditures(Collection::new(Category::Savings, Period::Monthly))
    }

    #[tokio::test]
    async fn test_select_sends_owner_filter_and_key() {
        let mock_server = MockServer::start().await;
        let owner = Uuid::new_v4();
        let rows = json!([{ "id": owner, "income": 2000.0 }]);

        Mock::given(method("GET"))
            .and(path("/rest/v1/income"))
            .and(query_param("id", format!("eq.{owner}")))
            .and(query_param("select", "*"))
            .and(header("apikey", "secret"))
            .and(header("Authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&rows))
            .mount(&mock_server)
            .await;

        let store = RestRowStore::new(&mock_server.uri(), "secret").unwrap();
        let result = store.select(Table::Income, owner).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0]["income"], 2000.0);
    }

    #[tokio::test]
    async fn test_insert_posts_row() {
        let mock_server = MockServer::start().await;
        let row = json!({ "expenditure_id": Uuid::new_v4(), "title": "Emergency fund" });

        Mock::given(method("POST"))
            .and(path("/rest/v1/monthly_savings"))
            .and(body_json(&row))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let store = RestRowStore::new(&mock_server.uri(), "secret").unwrap();
        store.insert(savings(), row).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_without_match_is_not_found() {
        let mock_server = MockServer::start().await;
        let owner = Uuid::new_v4();

        Mock::given(method("PATCH"))
            .and(path("/rest/v1/profiles"))
            .and(query_param("id", format!("eq.{owner}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&mock_server)
            .await;

        let store = RestRowStore::new(&mock_server.uri(), "secret").unwrap();
        let result = store
            .update(Table::Profiles, owner, json!({ "first_name": "Sam" }))
            .await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_reports_removed_rows() {
        let mock_server = MockServer::start().await;
        let key = Uuid::new_v4();

        Mock::given(method("DELETE"))
            .and(path("/rest/v1/monthly_savings"))
            .and(query_param("expenditure_id", format!("eq.{key}")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{ "expenditure_id": key }])),
            )
            .mount(&mock_server)
            .await;

        let store = RestRowStore::new(&mock_server.uri(), "secret").unwrap();
        assert!(store.delete(savings(), key).await.unwrap());
    }

    #[tokio::test]
    async fn test_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let store = RestRowStore::new(&mock_server.uri(), "wrong").unwrap();
        let result = store.select(Table::Profiles, Uuid::new_v4()).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 401 Unauthorized for table: profiles"
        );
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"rows": []}"#))
            .mount(&mock_server)
            .await;

        let store = RestRowStore::new(&mock_server.uri(), "secret").unwrap();
        let result = store.select(Table::Profiles, Uuid::new_v4()).await;
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse JSON response")
        );
    }
}
