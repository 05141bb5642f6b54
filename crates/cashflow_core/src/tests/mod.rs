//! Integration tests for the cash-flow engine
//!
//! Tests are organized by topic:
//! - `basic` - End-to-end scenarios and rule status reporting
//! - `conservation` - Exact amounts, spreading and category partition
//! - `escalation` - Escalated amounts flowing through a full run
//! - `investment` - Month-end sweep and investment projection
//! - `buckets` - Aggregation at every resolution
//! - `builder_dsl` - Builder DSL for fluent scenario setup

mod basic;
