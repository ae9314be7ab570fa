// src/services/pledge_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{GoodsRepository, PledgeRepository, ShipmentRepository},
    models::{
        ledger::{Direction, LedgerTags},
        pledges::{CustomerScope, PledgeView, ShipmentGood},
    },
    services::{catalog_service::CatalogService, ledger_service::LedgerService},
};

pub const GOODS_RECEIVED_NOTE: &str = "goods received";

/// What is being pledged: an existing catalog id, or a name to get-or-create.
#[derive(Debug, Clone)]
pub enum PledgeGood<'a> {
    Id(Uuid),
    Named {
        name: &'a str,
        origin: Option<&'a str>,
        unit_type: Option<&'a str>,
    },
}

#[derive(Clone)]
pub struct PledgeService {
    pledge_repo: PledgeRepository,
    goods_repo: GoodsRepository,
    shipment_repo: ShipmentRepository,
    catalog: CatalogService,
    ledger: LedgerService,
}

impl PledgeService {
    pub fn new(
        pledge_repo: PledgeRepository,
        goods_repo: GoodsRepository,
        shipment_repo: ShipmentRepository,
        catalog: CatalogService,
        ledger: LedgerService,
    ) -> Self {
        Self { pledge_repo, goods_repo, shipment_repo, catalog, ledger }
    }

    // --- REGISTER ---

    /// Creates the pledge and, for a positive quantity, books the full
    /// quantity into inventory right away. Pledge row, IN entry and balance
    /// change commit together or not at all.
    #[allow(clippy::too_many_arguments)]
    pub async fn register_pledge<'e, A>(
        &self,
        conn: A,
        shipment_id: i64,
        owner_id: i64,
        good: PledgeGood<'_>,
        quantity: Decimal,
        scope: CustomerScope,
        created_by: Option<i64>,
    ) -> Result<ShipmentGood, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        if quantity.is_sign_negative() {
            return Err(AppError::InvalidInput("Pledged quantity must not be negative.".into()));
        }

        let mut tx = conn.begin().await?;

        if !self.shipment_repo.belongs_to(&mut *tx, owner_id, shipment_id).await? {
            return Err(AppError::NotFound("Shipment"));
        }

        let good_id = match good {
            PledgeGood::Id(id) => {
                self.goods_repo
                    .find_by_id(&mut *tx, owner_id, id)
                    .await?
                    .ok_or(AppError::NotFound("Good"))?
                    .id
            }
            PledgeGood::Named { name, origin, unit_type } => {
                self.catalog
                    .ensure_good_in(&mut *tx, owner_id, name, origin, unit_type)
                    .await?
                    .id
            }
        };

        let pledge = self
            .insert_and_receive(&mut *tx, shipment_id, owner_id, good_id, quantity, scope, created_by)
            .await?;

        tx.commit().await?;

        tracing::info!(
            shipment_id,
            owner_id,
            pledge_id = %pledge.id,
            %good_id,
            %quantity,
            "pledge registered"
        );
        Ok(pledge)
    }

    #[allow(clippy::too_many_arguments)]
    async fn insert_and_receive(
        &self,
        conn: &mut PgConnection,
        shipment_id: i64,
        owner_id: i64,
        good_id: Uuid,
        quantity: Decimal,
        scope: CustomerScope,
        created_by: Option<i64>,
    ) -> Result<ShipmentGood, AppError> {
        let pledge = self
            .pledge_repo
            .insert(&mut *conn, shipment_id, owner_id, good_id, scope, quantity, created_by)
            .await?;

        if quantity > Decimal::ZERO {
            self.ledger
                .record(
                    conn,
                    owner_id,
                    good_id,
                    Direction::In,
                    quantity,
                    LedgerTags {
                        shipment_id: Some(shipment_id),
                        shipment_good_id: Some(pledge.id),
                        step_id: None,
                        note: Some(GOODS_RECEIVED_NOTE),
                    },
                )
                .await?;
        }

        Ok(pledge)
    }

    // --- REMOVE ---

    /// Hard-deletes the pledge. Ledger entries already written stay as they
    /// are: removal stops future allocation, it does not un-receive goods.
    pub async fn remove_pledge<'e, A>(&self, conn: A, pledge_id: Uuid, owner_id: i64) -> Result<(), AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;
        let removed = self.pledge_repo.delete(&mut *conn, owner_id, pledge_id).await?;
        if removed == 0 {
            return Err(AppError::NotFound("Pledge"));
        }

        tracing::info!(owner_id, %pledge_id, "pledge removed, ledger history kept");
        Ok(())
    }

    // --- LIST ---

    pub async fn list_pledges(&self, shipment_id: i64, owner_id: i64) -> Result<Vec<PledgeView>, AppError> {
        self.pledge_repo.list_views(owner_id, shipment_id).await
    }
}
