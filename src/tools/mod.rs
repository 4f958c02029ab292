//! Leaf tool implementations: filesystem enumeration and Mercurial diff.

pub mod fs;
pub mod hg;
