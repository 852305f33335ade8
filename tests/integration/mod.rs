//! Integration tests for content-addressed attachment placement

mod cli_parse;
mod organize_disk;
mod properties;
