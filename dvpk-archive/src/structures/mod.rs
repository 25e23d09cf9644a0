//! **you should instead use [`crate::archive`] most of the times**
//!
//! use this module if you actually need low level access to archive structure

pub mod dvpk;
pub mod dvpl;
pub mod meta;

pub(crate) mod checksum;
mod common;
