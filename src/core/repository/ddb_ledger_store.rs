use std::collections::HashMap;
use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{AttributeValue, Delete, Put, ReturnValue, TransactWriteItem};
use serde_json::Value;
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::{LEDGER_TABLES, LedgerStore, SEQUENCES_TABLE, Table, Write};
use crate::utils::ddb::{create_table, item_to_value, parse_item, parse_number_attribute};

// DynamoDB allows at most this many items in one TransactWriteItems call.
const MAX_TRANSACT_ITEMS: usize = 100;

#[derive(Debug)]
pub struct DDBLedgerStore {
    client: Client,
}

impl DDBLedgerStore {
    pub fn new(client: Client) -> Self {
        Self {
            client,
        }
    }

    // creates the ledger and sequence tables, skipping those that already exist
    pub async fn create_tables(&self) -> LibraryResult<()> {
        for table in LEDGER_TABLES.iter().chain([SEQUENCES_TABLE].iter()) {
            create_table(&self.client, table.name, table.key).await?;
        }
        Ok(())
    }

    fn to_transact_item(write: &Write) -> LibraryResult<TransactWriteItem> {
        match write {
            Write::Put { table, value, expected_version, .. } => {
                let mut put = Put::builder()
                    .table_name(table.name)
                    .set_item(Some(parse_item(value.clone())?))
                    .expression_attribute_names("#k", table.key);
                put = match expected_version {
                    None => put.condition_expression("attribute_not_exists(#k)"),
                    Some(version) => put
                        .condition_expression("attribute_exists(#k) AND version = :expected")
                        .expression_attribute_values(":expected", AttributeValue::N(version.to_string())),
                };
                Ok(TransactWriteItem::builder().put(put.build()).build())
            }
            Write::Delete { table, id, expected_version } => {
                let delete = Delete::builder()
                    .table_name(table.name)
                    .key(table.key, AttributeValue::S(id.to_string()))
                    .condition_expression("version = :expected")
                    .expression_attribute_values(":expected", AttributeValue::N(expected_version.to_string()))
                    .build();
                Ok(TransactWriteItem::builder().delete(delete).build())
            }
        }
    }
}

#[async_trait]
impl LedgerStore for DDBLedgerStore {
    async fn get(&self, table: Table, id: &str) -> LibraryResult<Option<Value>> {
        let res = self.client
            .get_item()
            .table_name(table.name)
            .key(table.key, AttributeValue::S(id.to_string()))
            .consistent_read(true)
            .send()
            .await?;
        Ok(res.item().map(item_to_value))
    }

    async fn scan(&self, table: Table) -> LibraryResult<Vec<Value>> {
        let mut records = vec![];
        let mut exclusive_start_key: Option<HashMap<String, AttributeValue>> = None;
        loop {
            let res = self.client
                .scan()
                .table_name(table.name)
                .consistent_read(true)
                .set_exclusive_start_key(exclusive_start_key.take())
                .send()
                .await?;
            for item in res.items().unwrap_or_default() {
                records.push(item_to_value(item));
            }
            match res.last_evaluated_key() {
                Some(key) if !key.is_empty() => exclusive_start_key = Some(key.clone()),
                _ => break,
            }
        }
        Ok(records)
    }

    async fn commit(&self, writes: &[Write]) -> LibraryResult<usize> {
        if writes.is_empty() {
            return Ok(0);
        }
        if writes.len() > MAX_TRANSACT_ITEMS {
            return Err(LibraryError::validation(format!("change set of {} writes exceeds {}",
                                                        writes.len(), MAX_TRANSACT_ITEMS).as_str(), None));
        }
        let items = writes.iter()
            .map(Self::to_transact_item)
            .collect::<LibraryResult<Vec<TransactWriteItem>>>()?;
        self.client
            .transact_write_items()
            .set_transact_items(Some(items))
            .send()
            .await.map(|_| writes.len()).map_err(LibraryError::from)
    }

    async fn next_sequence(&self, table: Table) -> LibraryResult<i64> {
        let res = self.client
            .update_item()
            .table_name(SEQUENCES_TABLE.name)
            .key(SEQUENCES_TABLE.key, AttributeValue::S(table.name.to_string()))
            .update_expression("ADD seq :one")
            .expression_attribute_values(":one", AttributeValue::N("1".to_string()))
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await?;
        match res.attributes() {
            Some(attrs) => Ok(parse_number_attribute("seq", attrs)),
            None => Err(LibraryError::database(format!("no sequence returned for {}", table.name).as_str(), None, false)),
        }
    }
}

#[cfg(test)]
mod tests {
    use async_once::AsyncOnce;
    use lazy_static::lazy_static;
    use serde_json::json;
    use crate::core::repository::{LEDGER_TABLES, LedgerStore, PATRONS_TABLE, SEQUENCES_TABLE, Write};
    use crate::core::repository::ddb_ledger_store::DDBLedgerStore;
    use crate::core::repository::RepositoryStore;
    use crate::utils::ddb::{build_db_client, delete_table};

    lazy_static! {
        static ref SUT_STORE: AsyncOnce<DDBLedgerStore> = AsyncOnce::new(async {
                let client = build_db_client(RepositoryStore::LocalDynamoDB).await;
                for table in LEDGER_TABLES.iter().chain([SEQUENCES_TABLE].iter()) {
                    let _ = delete_table(&client, table.name).await;
                }
                let store = DDBLedgerStore::new(client);
                store.create_tables().await.expect("should create tables");
                store
            });
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB Local on localhost:8000"]
    async fn test_should_commit_conditionally() {
        let store = SUT_STORE.get().await;
        let put = Write::Put {
            table: PATRONS_TABLE,
            id: "RD90001".to_string(),
            value: json!({"patron_id": "RD90001", "version": 0, "fine_amount": 0}),
            expected_version: None,
        };
        assert_eq!(1, store.commit(&[put.clone()]).await.expect("should commit"));
        assert!(store.commit(&[put]).await.is_err());
        let loaded = store.get(PATRONS_TABLE, "RD90001").await.expect("should get").expect("should exist");
        assert_eq!(0, loaded["version"]);
        assert!(!store.scan(PATRONS_TABLE).await.expect("should scan").is_empty());
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB Local on localhost:8000"]
    async fn test_should_increment_sequence() {
        let store = SUT_STORE.get().await;
        let first = store.next_sequence(PATRONS_TABLE).await.expect("should count");
        let second = store.next_sequence(PATRONS_TABLE).await.expect("should count");
        assert_eq!(first + 1, second);
    }
}
