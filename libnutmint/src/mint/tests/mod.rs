//! End-to-end flows against a mint backed by the in-memory store, the local signer and the fake Lightning backend.

mod concurrency_tests;
mod state_tests;
mod wallet;
