//! Decorates EMBL flat-files with functional annotations and non-coding RNA features.

pub mod error;

pub mod annotation;
pub mod cli;
pub mod config;
pub mod decorator;
pub mod embl;
pub mod input;
pub mod interproscan;
pub mod pipeline;
pub mod rfam;
pub mod strand;
