//! HTTP-level integration tests over the in-memory store.

mod helpers;

mod delivery_test;
mod inventory_test;
mod webhook_test;
