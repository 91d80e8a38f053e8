//! Product Repository

use super::{BaseRepository, RepoError, RepoResult};
use shared::models::product::{CommissionType, DiscountType, Product, ProductCreate};
use shared::util;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a product after checking the commission/discount invariants.
    ///
    /// Percentage discounts with value >= 100 are rejected here: the inverse
    /// discount recovery divides by `1 - value/100`.
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        validate_config(&data)?;

        let product = Product {
            product_id: util::new_id(),
            company_id: data.company_id,
            name: data.name,
            price: data.price,
            currency: data.currency,
            commission_rate: data.commission_rate,
            commission_type: data.commission_type,
            affiliate_discount_enabled: data.affiliate_discount_enabled,
            affiliate_discount_type: data.affiliate_discount_type,
            affiliate_discount_value: data.affiliate_discount_value,
            inventory_tracking: data.inventory_tracking,
            inventory_quantity: data.inventory_quantity,
            external_checkout_url: data.external_checkout_url,
            created_at: util::now_millis(),
        };

        let created: Option<Product> = self
            .base
            .db()
            .create("product")
            .content(product)
            .await
            .map_err(RepoError::from)?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    pub async fn find_by_id(&self, product_id: &str) -> RepoResult<Option<Product>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM product WHERE product_id = $pid LIMIT 1")
            .bind(("pid", product_id.to_string()))
            .await
            .map_err(RepoError::from)?;
        let products: Vec<Product> = result.take(0).map_err(RepoError::from)?;
        Ok(products.into_iter().next())
    }

    /// Check-and-decrement in a single conditional statement.
    ///
    /// Returns `false` when the row no longer has enough stock. The caller
    /// treats that as a reconciliation event, never as a purchase failure.
    pub async fn decrement_inventory(&self, product_id: &str, quantity: i64) -> RepoResult<bool> {
        let mut result = self
            .base
            .db()
            .query(
                r#"
                UPDATE product SET inventory_quantity -= $qty
                WHERE product_id = $pid
                  AND inventory_tracking = true
                  AND inventory_quantity >= $qty
                RETURN AFTER
                "#,
            )
            .bind(("pid", product_id.to_string()))
            .bind(("qty", quantity))
            .await
            .map_err(RepoError::from)?;
        let updated: Vec<Product> = result.take(0).map_err(RepoError::from)?;
        Ok(!updated.is_empty())
    }
}

fn validate_config(data: &ProductCreate) -> RepoResult<()> {
    if !data.price.is_finite() || data.price < 0.0 {
        return Err(RepoError::Validation(format!(
            "price must be a non-negative finite number, got {}",
            data.price
        )));
    }
    if !data.commission_rate.is_finite() || data.commission_rate < 0.0 {
        return Err(RepoError::Validation(format!(
            "commission_rate must be non-negative, got {}",
            data.commission_rate
        )));
    }
    if data.commission_type == CommissionType::Percentage && data.commission_rate > 100.0 {
        return Err(RepoError::Validation(format!(
            "percentage commission_rate must be in [0, 100], got {}",
            data.commission_rate
        )));
    }
    if data.affiliate_discount_enabled {
        if let (Some(DiscountType::Percentage), Some(value)) =
            (data.affiliate_discount_type, data.affiliate_discount_value)
            && !(0.0..100.0).contains(&value)
        {
            return Err(RepoError::Validation(format!(
                "percentage discount value must be in [0, 100), got {value}"
            )));
        }
        if let Some(value) = data.affiliate_discount_value
            && (!value.is_finite() || value < 0.0)
        {
            return Err(RepoError::Validation(format!(
                "discount value must be non-negative, got {value}"
            )));
        }
    }
    if data.inventory_tracking && data.inventory_quantity < 0 {
        return Err(RepoError::Validation(format!(
            "inventory_quantity must be >= 0 when tracked, got {}",
            data.inventory_quantity
        )));
    }
    Ok(())
}
