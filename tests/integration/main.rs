//! Integration tests for the playpen project store, compiler and CLI

mod cli_contracts;
mod cli_parse;
mod editor_flow;
mod store_properties;
mod support;
