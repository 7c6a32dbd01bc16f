//! Domain logic for copydesk: the flat-key content records stored in the
//! `copy` table, the nested documents the sites are built from, and the
//! transform between the two.

pub mod auth;
pub mod document;
pub mod keypath;
pub mod record;
pub mod session;
pub mod store;
