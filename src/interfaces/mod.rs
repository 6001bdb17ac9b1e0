//! Adapters between the engine and the outside world: CSV request streams,
//! CSV state dumps, and the directory fixture loader.

pub mod csv;
pub mod fixture;
