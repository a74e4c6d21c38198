//! Core library for Scanshelf.
//!
//! Scan sessions are stored as [`storage::Folder`]s of [`storage::Page`]s in a single
//! JSON document, with optional PDF attachments kept on disk next to it. See the
//! [`storage`] module for the data model and persistence rules, and [`scan`] for turning
//! scanner output into stored folders.

pub mod config;
pub mod scan;
pub mod storage;
