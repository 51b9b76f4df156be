//! Command-line front end for the customer move workflow.

pub mod commands;
pub mod config;
