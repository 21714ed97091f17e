//! Integration tests for Layer 1: Storage
//!
//! Tests for entity tracking, component stores, change sets, and hierarchies.
