//! On-disk database bootstrap: the production engine path, in a tempdir.

use payout_server::db::DbService;
use shared::models::partnership::{PartnershipCreate, PartnershipStatus};
use tempfile::TempDir;

#[tokio::test]
async fn boots_rocksdb_and_applies_schema_twice() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("referra.db");
    let path_str = path.to_string_lossy().to_string();

    {
        let db = DbService::new(&path_str).await.unwrap();
        let repo = payout_server::db::repository::PartnershipRepository::new(db.db.clone());
        repo.create(PartnershipCreate {
            affiliate_id: "aff_1".to_string(),
            company_id: "co_1".to_string(),
            product_id: None,
            affiliate_code: "boot-code".to_string(),
            status: PartnershipStatus::Approved,
        })
        .await
        .unwrap();

        // UNIQUE index on affiliate_code is live
        let dup = repo
            .create(PartnershipCreate {
                affiliate_id: "aff_2".to_string(),
                company_id: "co_1".to_string(),
                product_id: None,
                affiliate_code: "boot-code".to_string(),
                status: PartnershipStatus::Pending,
            })
            .await;
        assert!(dup.is_err());
    }

    // Second boot re-applies the idempotent schema and sees the data
    let db = DbService::new(&path_str).await.unwrap();
    let repo = payout_server::db::repository::PartnershipRepository::new(db.db.clone());
    let found = repo
        .find_by_code_and_company("boot-code", "co_1")
        .await
        .unwrap();
    assert!(found.is_some());
    assert_eq!(found.unwrap().affiliate_id, "aff_1");
}
