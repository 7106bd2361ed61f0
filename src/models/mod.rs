//! Request and Response models for the local API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{
    BatchAddRequest, CacheCompatibilityRequest, CacheKeyQuery, CacheSearchRequest,
    DescribeRequest, FailureReport, MergeRequest, PartsQuery,
};
pub use responses::{
    CacheSection, CacheStatsResponse, CacheWriteResponse, CachedValueResponse, ContainsResponse,
    DescribeResponse, EncodeResponse, FailureResponse, HealthResponse, ListResponse,
    MutationResponse, SummaryResponse,
};
