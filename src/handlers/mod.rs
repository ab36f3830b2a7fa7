//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Performs business logic (database queries, validation)
//! 3. Returns HTTP response (JSON, status code)

/// Account management endpoints
pub mod accounts;
/// Registration, login, and password reset endpoints
pub mod auth;
/// Budget and budget alert endpoints
pub mod budgets;
/// CSV/PDF export and CSV import endpoints
pub mod export;
/// Health check endpoint
pub mod health;
/// Invoice lifecycle endpoints
pub mod invoices;
/// Financial report endpoints
pub mod reports;
/// Transaction recording and query endpoints
pub mod transactions;
