pub mod collector_service;
