//! Post service module: listing CRUD and search

mod service;


pub use service::PostService;
