// src/services/catalog_service.rs

use sqlx::{Acquire, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::GoodsRepository,
    models::goods::{Good, GoodKey},
};

#[derive(Clone)]
pub struct CatalogService {
    goods_repo: GoodsRepository,
}

impl CatalogService {
    pub fn new(goods_repo: GoodsRepository) -> Self {
        Self { goods_repo }
    }

    /// Get-or-create by (owner, name, origin).
    pub async fn ensure_good<'e, A>(
        &self,
        conn: A,
        owner_id: i64,
        name: &str,
        origin: Option<&str>,
        unit_type: Option<&str>,
    ) -> Result<Good, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;
        self.ensure_good_in(&mut *conn, owner_id, name, origin, unit_type).await
    }

    /// Same as `ensure_good`, on a connection the caller already holds
    /// (usually an open transaction).
    pub(crate) async fn ensure_good_in(
        &self,
        conn: &mut PgConnection,
        owner_id: i64,
        name: &str,
        origin: Option<&str>,
        unit_type: Option<&str>,
    ) -> Result<Good, AppError> {
        let key = GoodKey::new(name, origin);
        if !key.is_valid() {
            return Err(AppError::InvalidInput("Good name must not be empty.".into()));
        }
        let unit_type = unit_type.map(str::trim).unwrap_or_default();

        // Insert-or-ignore, then re-read: whoever wins the race, both callers
        // end up with the same row.
        if let Some(good) = self
            .goods_repo
            .insert_if_absent(&mut *conn, owner_id, &key, unit_type)
            .await?
        {
            tracing::debug!(owner_id, good_id = %good.id, name = %good.name, "good created");
            return Ok(good);
        }

        self.goods_repo
            .find_by_key(&mut *conn, owner_id, &key)
            .await?
            .ok_or(AppError::NotFound("Good"))
    }

    pub async fn get_good<'e, A>(&self, conn: A, owner_id: i64, good_id: Uuid) -> Result<Good, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;
        self.goods_repo
            .find_by_id(&mut *conn, owner_id, good_id)
            .await?
            .ok_or(AppError::NotFound("Good"))
    }

    pub async fn list_goods(&self, owner_id: i64) -> Result<Vec<Good>, AppError> {
        self.goods_repo.list(owner_id).await
    }
}
