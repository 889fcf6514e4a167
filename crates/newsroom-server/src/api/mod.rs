// ABOUTME: API module containing all HTTP handler functions for the newsroom REST API.
// ABOUTME: Organized into sub-modules for the news collection and the OAuth admin login.

pub mod auth;
pub mod news;
