pub mod cash_deposit_repo;
pub mod inventory_repo;
pub mod ledger_repo;
pub mod outbox_repo;
pub mod purchase_repo;
pub mod supplier_repo;
