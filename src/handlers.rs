pub mod allocations;
pub mod goods;
pub mod ledger;
pub mod pledges;
pub mod summary;
