//! Elementary files of an eMRTD, ICAO 9303-10.
//!
//! Every parser takes the complete file contents. An empty file means the
//! file is not present and yields `Ok(None)`.

mod card_security;
mod dg1;
mod dg13;
mod dg14;
mod dg15;
mod ef_card_access;
mod ef_dir;

pub use self::{
    card_security::EfCardSecurity, dg1::EfDg1, dg13::EfDg13, dg14::EfDg14, dg15::EfDg15,
    ef_card_access::EfCardAccess, ef_dir::EfDir,
};
use {
    crate::tlv::{Node, Nodes},
    anyhow::{ensure, Result},
};

/// Top level node of a data group, which must be present.
fn root(nodes: &Nodes, tag: u32) -> Result<&Node> {
    let root = nodes.get_node(tag);
    ensure!(root.is_valid_node(), "Root node ({tag:02X}) missing");
    Ok(root)
}
