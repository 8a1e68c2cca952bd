//! Infrastructure layer
//!
//! This module handles external integrations and services:
//! - CLI argument processing
//! - Configuration loading
//! - Page fetchers for the REST backend
//! - Notification ports

pub mod cli;
pub mod config;
pub mod fetcher;
pub mod notifier;
pub mod resource;
pub mod rest;
