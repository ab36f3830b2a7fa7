//! Business logic services.
//!
//! Services contain the core accounting logic separated from HTTP
//! handlers: balance maintenance, period windows, spend aggregation,
//! report building, invoice totaling and the CSV/PDF codecs.

pub mod budget_service;
pub mod export_service;
pub mod invoice_service;
pub mod ledger_service;
pub mod ownership;
pub mod period;
pub mod report_service;
