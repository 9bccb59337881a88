pub mod balance_calculator;
pub mod cash_deposit_service;
pub mod fanout;
pub mod inventory_service;
pub mod ledger_service;
pub mod supplier_balance;
pub mod supplier_service;
pub mod tx;
