// Application layer - Use cases and session orchestration
pub mod chart_service;
pub mod device_cloud;
pub mod ingest_service;
pub mod session_service;
