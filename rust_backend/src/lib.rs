//! Multi-tenant timezone projection and aggregation engine.
//!
//! Orders are stored against a single UTC instant. Each merchant (tenant)
//! owns one IANA timezone, and every business question is asked on that
//! merchant's local calendar: which local day an order fell on, whether it
//! was placed during business hours, how sales break down per local hour.
//!
//! # Layout
//!
//! - [`core`]: tenant and record models, engine errors
//! - [`time`]: zone registry, instant projection, input parsing
//! - [`services`]: classification, batch projection, aggregation, comparison
//! - [`db`]: repository traits, in-memory store, async service layer
//! - [`config`]: TOML configuration and engine assembly
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use merchant_tz::core::{RawRecord, RecordStatus, Tenant, TenantId};
//! use merchant_tz::services::{tenant_map, Engine};
//!
//! let engine = Engine::default();
//! let tenants = tenant_map(vec![Tenant::new(1, "SP-Merchant", "America/Sao_Paulo")]);
//! let record = RawRecord {
//!     id: 1,
//!     order_number: "ORD-1".into(),
//!     tenant_id: TenantId(1),
//!     amount: 50.0,
//!     currency: "BRL".into(),
//!     status: RecordStatus::Paid,
//!     order_time_utc: Utc.with_ymd_and_hms(2024, 8, 20, 2, 0, 0).unwrap(),
//!     completed_time_utc: None,
//! };
//!
//! let projected = engine.project(&[record], &tenants).unwrap();
//! assert_eq!(projected[0].local_date().to_string(), "2024-08-19");
//! assert_eq!(projected[0].local_hour(), 23);
//! ```

pub mod config;
pub mod core;
pub mod db;
pub mod services;
pub mod time;


pub use config::EngineConfig;
pub use self::core::{EngineError, EngineResult};
pub use services::Engine;
