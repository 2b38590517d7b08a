//! Unit tests for the mail module

mod service_tests;
