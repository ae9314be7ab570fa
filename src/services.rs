pub mod allocation_service;
pub mod catalog_service;
pub mod ledger_service;
pub mod pledge_service;
pub mod resolver;
pub mod summary_service;
