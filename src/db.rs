pub mod allocation_repo;
pub use allocation_repo::AllocationRepository;
pub mod goods_repo;
pub use goods_repo::GoodsRepository;
pub mod ledger_repo;
pub use ledger_repo::LedgerRepository;
pub mod pledge_repo;
pub use pledge_repo::PledgeRepository;
pub mod shipment_repo;
pub use shipment_repo::ShipmentRepository;
pub mod summary_repo;
pub use summary_repo::SummaryRepository;
