//! Downloads vendor logos for the site's integration pages.
//!
//! Each logo is fetched once, sniffed to make sure it is really an image
//! (hosts behind bot protection happily answer with an HTML page), and
//! stored as `{identifier}{extension}`. See README for the input formats.
pub mod config;
pub mod error;
pub mod fetch;
pub mod file;
pub mod io;
pub mod manifest;
pub mod request;
pub mod result;
pub mod schedule;
