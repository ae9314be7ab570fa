// src/db/goods_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::goods::{Good, GoodKey},
};

#[derive(Clone)]
pub struct GoodsRepository {
    pool: PgPool,
}

impl GoodsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Reads
    // ---

    pub async fn list(&self, owner_id: i64) -> Result<Vec<Good>, AppError> {
        let goods = sqlx::query_as::<_, Good>(
            "SELECT * FROM goods WHERE owner_id = $1 ORDER BY name ASC, origin ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(goods)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        owner_id: i64,
        good_id: Uuid,
    ) -> Result<Option<Good>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let good = sqlx::query_as::<_, Good>("SELECT * FROM goods WHERE owner_id = $1 AND id = $2")
            .bind(owner_id)
            .bind(good_id)
            .fetch_optional(executor)
            .await?;
        Ok(good)
    }

    pub async fn find_by_key<'e, E>(
        &self,
        executor: E,
        owner_id: i64,
        key: &GoodKey,
    ) -> Result<Option<Good>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let good = sqlx::query_as::<_, Good>(
            "SELECT * FROM goods WHERE owner_id = $1 AND name = $2 AND origin = $3",
        )
        .bind(owner_id)
        .bind(&key.name)
        .bind(&key.origin)
        .fetch_optional(executor)
        .await?;
        Ok(good)
    }

    // ---
    // Writes
    // ---

    /// Inserts the good unless the natural key already exists.
    /// Returns None when another writer got there first.
    pub async fn insert_if_absent<'e, E>(
        &self,
        executor: E,
        owner_id: i64,
        key: &GoodKey,
        unit_type: &str,
    ) -> Result<Option<Good>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let good = sqlx::query_as::<_, Good>(
            r#"
            INSERT INTO goods (owner_id, name, origin, unit_type)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT ON CONSTRAINT goods_owner_name_origin_key DO NOTHING
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(&key.name)
        .bind(&key.origin)
        .bind(unit_type)
        .fetch_optional(executor)
        .await?;
        Ok(good)
    }
}
