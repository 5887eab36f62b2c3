//! This module contains purpose-built data structures used by the searchers.

pub mod discrete_pdf;
