use import_api::config::ImportConfig;
use import_api::import::{
    CandidateAddress, CandidateRecord, HistoryStore, ImportStatus, NewOrganization,
    OrganizationStore, PgHistoryStore, PgOrganizationStore, StorageError,
};
use import_api::postgres_pipeline;
use import_api::test_support::{TestDatabase, TestDatabaseError};

fn candidate(name: &str, zip: &str, rating: Option<f64>) -> CandidateRecord {
    CandidateRecord {
        name: Some(name.to_string()),
        full_name: Some(format!("{name} Incorporated")),
        rating,
        employees_count: Some(5),
        address: Some(CandidateAddress {
            street: Some("Main St 1".to_string()),
            zip_code: Some(zip.to_string()),
        }),
        ..CandidateRecord::default()
    }
}

async fn provision(test: &str) -> Option<TestDatabase> {
    match TestDatabase::new_from_env().await {
        Ok(db) => Some(db),
        Err(TestDatabaseError::MissingUrl) => {
            eprintln!("skipping {test}: TEST_DATABASE_URL not set");
            None
        }
        Err(err) => panic!("failed to provision test database: {err:?}"),
    }
}

#[tokio::test]
async fn reimporting_the_same_organization_fails_and_both_runs_are_recorded() {
    let Some(test_db) = provision("postgres reimport test").await else {
        return;
    };
    let pipeline = postgres_pipeline(test_db.pool_clone(), ImportConfig::default());

    let first = pipeline
        .run(vec![candidate("Acme", "10001", Some(4.5))], "alice")
        .await
        .expect("first run recorded");
    assert_eq!(first.status, ImportStatus::Success);
    assert_eq!(first.imported_count, 1);
    assert!(first.error_message.is_none());

    let second = pipeline
        .run(vec![candidate("Acme", "10001", Some(4.5))], "bob")
        .await
        .expect("second run recorded");
    assert_eq!(second.status, ImportStatus::Failed);
    assert_eq!(second.imported_count, 0);
    let message = second.error_message.clone().expect("failure explained");
    assert!(message.contains("Acme"), "unexpected message: {message}");

    let history = pipeline.history(10, 0).await.expect("history listed");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, second.id);
    assert_eq!(history[1].id, first.id);
    assert_eq!(pipeline.history_count().await.expect("count"), 2);

    test_db.close().await.expect("failed to drop test database");
}

#[tokio::test]
async fn partial_batch_keeps_the_valid_records() {
    let Some(test_db) = provision("postgres partial batch test").await else {
        return;
    };
    let pool = test_db.pool_clone();
    let pipeline = postgres_pipeline(pool.clone(), ImportConfig::default());

    let history = pipeline
        .run(
            vec![
                candidate("Acme", "10001", Some(4.5)),
                candidate("Globex", "20002", None),
                candidate("Initech", "30003", Some(3.0)),
            ],
            "alice",
        )
        .await
        .expect("run recorded");

    assert_eq!(history.status, ImportStatus::Partial);
    assert_eq!(history.imported_count, 2);

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM organizations")
        .fetch_one(&pool)
        .await
        .expect("count organizations");
    assert_eq!(stored, 2);

    test_db.close().await.expect("failed to drop test database");
}

#[tokio::test]
async fn unique_indexes_surface_as_unique_violations() {
    let Some(test_db) = provision("postgres unique violation test").await else {
        return;
    };
    let store = PgOrganizationStore::new(test_db.pool_clone());

    let organization = NewOrganization {
        name: "Acme".to_string(),
        full_name: None,
        rating: 4.5,
        annual_turnover: None,
        employees_count: None,
        organization_type: None,
        street: None,
        zip_code: "10001".to_string(),
    };
    let stored = store.insert(organization.clone()).await.expect("first insert");
    assert_eq!(stored.name, "Acme");
    assert!(store.exists_by_name("Acme").await.expect("lookup"));
    assert!(store.exists_by_zip_code("10001").await.expect("lookup"));

    let same_zip = NewOrganization {
        name: "Globex".to_string(),
        ..organization.clone()
    };
    match store.insert(same_zip).await {
        Err(StorageError::UniqueViolation { constraint }) => {
            assert_eq!(constraint, "addresses_zip_code_key");
        }
        other => panic!("expected unique violation, got {other:?}"),
    }

    let same_name = NewOrganization {
        zip_code: "20002".to_string(),
        ..organization
    };
    match store.insert(same_name).await {
        Err(StorageError::UniqueViolation { constraint }) => {
            assert_eq!(constraint, "organizations_name_key");
        }
        other => panic!("expected unique violation, got {other:?}"),
    }

    // The rolled back organization insert must not leave its address behind.
    assert!(!store.exists_by_zip_code("20002").await.expect("lookup"));

    test_db.close().await.expect("failed to drop test database");
}

#[tokio::test]
async fn history_entries_are_fetched_by_id() {
    let Some(test_db) = provision("postgres history lookup test").await else {
        return;
    };
    let pipeline = postgres_pipeline(test_db.pool_clone(), ImportConfig::default());
    let history_store = PgHistoryStore::new(test_db.pool_clone());

    let recorded = pipeline
        .run(vec![candidate("Acme", "10001", Some(4.5))], "alice")
        .await
        .expect("run recorded");

    let fetched = history_store
        .get(recorded.id)
        .await
        .expect("lookup")
        .expect("entry exists");
    assert_eq!(fetched.username, "alice");
    assert_eq!(fetched.status, ImportStatus::Success);
    assert!(history_store.get(recorded.id + 1000).await.expect("lookup").is_none());

    test_db.close().await.expect("failed to drop test database");
}
