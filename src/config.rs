// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, str::FromStr, time::Duration};

use crate::{
    db::{
        AllocationRepository, GoodsRepository, LedgerRepository, PledgeRepository,
        ShipmentRepository, SummaryRepository,
    },
    middleware::auth::TokenVerifier,
    services::{
        allocation_service::AllocationService, catalog_service::CatalogService,
        ledger_service::LedgerService, pledge_service::PledgeService,
        resolver::CrossShipmentResolver, summary_service::SummaryService,
    },
};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
}

impl Config {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET must be set")?;
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let db_max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?;
        let acquire_secs: u64 = parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 3)?;

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            db_max_connections,
            db_acquire_timeout: Duration::from_secs(acquire_secs),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}

// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub token_verifier: TokenVerifier,
    pub catalog_service: CatalogService,
    pub ledger_service: LedgerService,
    pub pledge_service: PledgeService,
    pub allocation_service: AllocationService,
    pub summary_service: SummaryService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.db_acquire_timeout)
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Database connection established");

        Ok(Self::from_pool(db_pool, config.jwt_secret.clone()))
    }

    /// Builds the dependency graph around an existing pool.
    pub fn from_pool(db_pool: PgPool, jwt_secret: String) -> Self {
        let goods_repo = GoodsRepository::new(db_pool.clone());
        let ledger_repo = LedgerRepository::new(db_pool.clone());
        let pledge_repo = PledgeRepository::new(db_pool.clone());
        let allocation_repo = AllocationRepository::new(db_pool.clone());
        let summary_repo = SummaryRepository::new(db_pool.clone());
        let shipment_repo = ShipmentRepository::new();

        let catalog_service = CatalogService::new(goods_repo.clone());
        let ledger_service = LedgerService::new(ledger_repo);
        let pledge_service = PledgeService::new(
            pledge_repo.clone(),
            goods_repo,
            shipment_repo.clone(),
            catalog_service.clone(),
            ledger_service.clone(),
        );
        let resolver = CrossShipmentResolver::new(shipment_repo.clone(), pledge_repo.clone());
        let allocation_service = AllocationService::new(
            allocation_repo,
            pledge_repo,
            shipment_repo,
            resolver,
            ledger_service.clone(),
        );
        let summary_service = SummaryService::new(summary_repo, ledger_service.clone());

        Self {
            db_pool,
            token_verifier: TokenVerifier::new(jwt_secret),
            catalog_service,
            ledger_service,
            pledge_service,
            allocation_service,
            summary_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_are_missing() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/ledger"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.db_acquire_timeout, Duration::from_secs(3));
    }

    #[test]
    fn required_vars_are_enforced() {
        let err = Config::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn invalid_numbers_are_reported() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/ledger"),
            ("JWT_SECRET", "s3cret"),
            ("DB_MAX_CONNECTIONS", "many"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("DB_MAX_CONNECTIONS"));
    }
}
