//! Configuration module for Undertekst.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    FallbackSettings, ProxySettings, ResolverSettings, ServerSettings, Settings,
};
