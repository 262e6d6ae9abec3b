//! State management module
//!
//! This module holds the UI-free core of the application:
//! - Marker kinds, catalog, and marker data (marker.rs)
//! - Per-image marker operations (image.rs)
//! - Per-floor image galleries with active selection (gallery.rs)
//! - The Building → Floor → Image ownership tree and form fields (household.rs)
//! - Editor interaction state: tool arming, drops, edit focus (editor.rs)

pub mod editor;
pub mod gallery;
pub mod household;
pub mod image;
pub mod marker;
