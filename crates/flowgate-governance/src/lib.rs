//! Flowgate Governance
//!
//! Authorizes workflow steps against registered policies and keeps the
//! append-only audit trail.
//!
//! # Condition grammar
//!
//! | Condition | Matches when |
//! |---|---|
//! | `action:<regex>` | the action name matches the pattern (case-insensitive, unanchored) |
//! | `agent:<id>` | the agent id equals `<id>` (case-insensitive) |
//! | `param:<key>:<op>:<value>` | parameter `<key>` exists and compares true with `<op>` |
//! | `always` | always |
//!
//! Operators are `eq`, `neq`, `contains` (case-insensitive on string forms)
//! and `gt`, `lt` (numeric; unparseable values never match). Any other
//! condition never matches.

pub mod audit;
pub mod condition;
pub mod engine;

pub use audit::InMemoryAuditLog;
pub use condition::Condition;
pub use engine::RuleBasedPolicyEngine;
