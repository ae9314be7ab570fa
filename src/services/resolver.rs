// src/services/resolver.rs

use std::collections::{HashMap, HashSet};

use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{PledgeRepository, ShipmentRepository},
    models::pledges::{CustomerScope, ShipmentGood},
};

/// How a pledge can be reached from the requesting shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reach {
    /// The pledge sits on the requesting shipment.
    Direct,
    /// The pledge sits on a linked shipment and its scope covers one of the
    /// requesting shipment's customers.
    Linked,
    Unreachable,
}

/// Eligibility of one pledge for a request coming from `requesting_shipment`.
pub fn reach(
    pledge_shipment: i64,
    pledge_scope: CustomerScope,
    requesting_shipment: i64,
    linked: &HashSet<i64>,
    customers: &HashSet<i64>,
) -> Reach {
    if pledge_shipment == requesting_shipment {
        return Reach::Direct;
    }
    if !linked.contains(&pledge_shipment) {
        return Reach::Unreachable;
    }
    match pledge_scope {
        CustomerScope::AllCustomers => Reach::Linked,
        CustomerScope::Customer(party) if customers.contains(&party) => Reach::Linked,
        CustomerScope::Customer(_) => Reach::Unreachable,
    }
}

/// Pledges a shipment may draw from, keyed by pledge id.
#[derive(Debug, Default)]
pub struct EligiblePool {
    pledges: HashMap<Uuid, (ShipmentGood, Reach)>,
}

impl EligiblePool {
    pub fn get(&self, pledge_id: &Uuid) -> Option<&(ShipmentGood, Reach)> {
        self.pledges.get(pledge_id)
    }

    pub fn len(&self) -> usize {
        self.pledges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pledges.is_empty()
    }

    pub fn from_candidates(
        candidates: Vec<ShipmentGood>,
        requesting_shipment: i64,
        linked: &HashSet<i64>,
        customers: &HashSet<i64>,
    ) -> Self {
        let pledges = candidates
            .into_iter()
            .filter_map(|pledge| {
                match reach(pledge.shipment_id, pledge.scope(), requesting_shipment, linked, customers) {
                    Reach::Unreachable => None,
                    r => Some((pledge.id, (pledge, r))),
                }
            })
            .collect();
        Self { pledges }
    }
}

#[derive(Clone)]
pub struct CrossShipmentResolver {
    shipment_repo: ShipmentRepository,
    pledge_repo: PledgeRepository,
}

impl CrossShipmentResolver {
    pub fn new(shipment_repo: ShipmentRepository, pledge_repo: PledgeRepository) -> Self {
        Self { shipment_repo, pledge_repo }
    }

    /// Pledges on `shipment_id`, plus pledges on linked shipments whose scope
    /// covers one of its customers. Always read fresh: links and customer sets
    /// can change between calls.
    pub async fn eligible_pool(
        &self,
        conn: &mut PgConnection,
        owner_id: i64,
        shipment_id: i64,
    ) -> Result<EligiblePool, AppError> {
        let linked: HashSet<i64> = self
            .shipment_repo
            .linked_shipments(&mut *conn, owner_id, shipment_id)
            .await?
            .into_iter()
            .collect();
        let customers: HashSet<i64> = self
            .shipment_repo
            .customers_of(&mut *conn, shipment_id)
            .await?
            .into_iter()
            .collect();

        let mut shipments: Vec<i64> = Vec::with_capacity(linked.len() + 1);
        shipments.push(shipment_id);
        shipments.extend(linked.iter().copied());

        let candidates = self.pledge_repo.list_on_shipments(&mut *conn, &shipments).await?;
        let pool = EligiblePool::from_candidates(candidates, shipment_id, &linked, &customers);

        tracing::debug!(
            shipment_id,
            linked = linked.len(),
            customers = customers.len(),
            eligible = pool.len(),
            "eligible pledge pool resolved"
        );
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn set(ids: &[i64]) -> HashSet<i64> {
        ids.iter().copied().collect()
    }

    fn pledge(shipment_id: i64, scope: CustomerScope) -> ShipmentGood {
        let (all, party) = scope.columns();
        ShipmentGood {
            id: Uuid::new_v4(),
            shipment_id,
            owner_id: 1,
            good_id: Uuid::new_v4(),
            customer_party_id: party,
            applies_to_all_customers: all,
            quantity: Decimal::from(10),
            created_at: Utc::now(),
            created_by: None,
        }
    }

    #[test]
    fn own_shipment_is_always_reachable() {
        let r = reach(100, CustomerScope::Customer(99), 100, &set(&[]), &set(&[]));
        assert_eq!(r, Reach::Direct);
    }

    #[test]
    fn unlinked_shipment_is_unreachable() {
        let r = reach(300, CustomerScope::AllCustomers, 100, &set(&[200]), &set(&[7]));
        assert_eq!(r, Reach::Unreachable);
    }

    #[test]
    fn linked_shipment_needs_a_shared_customer() {
        let linked = set(&[200]);
        let customers = set(&[7, 8]);
        assert_eq!(reach(200, CustomerScope::Customer(7), 100, &linked, &customers), Reach::Linked);
        assert_eq!(reach(200, CustomerScope::Customer(9), 100, &linked, &customers), Reach::Unreachable);
        assert_eq!(reach(200, CustomerScope::AllCustomers, 100, &linked, &customers), Reach::Linked);
    }

    #[test]
    fn all_customer_pledge_on_linked_shipment_is_eligible_even_without_customers() {
        let r = reach(200, CustomerScope::AllCustomers, 100, &set(&[200]), &set(&[]));
        assert_eq!(r, Reach::Linked);
    }

    #[test]
    fn pool_keeps_only_reachable_candidates() {
        let own = pledge(100, CustomerScope::Customer(1));
        let shared = pledge(200, CustomerScope::Customer(7));
        let foreign_customer = pledge(200, CustomerScope::Customer(9));
        let unlinked = pledge(300, CustomerScope::AllCustomers);

        let pool = EligiblePool::from_candidates(
            vec![own.clone(), shared.clone(), foreign_customer.clone(), unlinked.clone()],
            100,
            &set(&[200]),
            &set(&[7]),
        );

        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(&own.id).map(|(_, r)| *r), Some(Reach::Direct));
        assert_eq!(pool.get(&shared.id).map(|(_, r)| *r), Some(Reach::Linked));
        assert!(pool.get(&foreign_customer.id).is_none());
        assert!(pool.get(&unlinked.id).is_none());
    }
}
