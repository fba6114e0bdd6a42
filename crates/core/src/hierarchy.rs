#![forbid(unsafe_code)]

use crate::model::ActivityLink;
use std::collections::BTreeSet;

pub const ROOT_LEVEL: i64 = 1;
pub const MAX_LEVEL: i64 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DepthError {
    Exceeded,
}

impl DepthError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Exceeded => "maximum activity depth is 3 levels",
        }
    }
}

/// Level a child created under a parent at `parent_level` would get.
/// A parent already at `MAX_LEVEL` cannot take children.
pub fn child_level(parent_level: i64) -> Result<i64, DepthError> {
    if parent_level >= MAX_LEVEL {
        return Err(DepthError::Exceeded);
    }
    Ok(parent_level + 1)
}

/// The roots plus every activity transitively reachable by following
/// parent->child edges downward from any of them.
///
/// Expands to a fixed point, so it is correct for arbitrary root sets; with
/// the depth bound the loop settles within two rounds past the roots.
pub fn descendant_closure(roots: &BTreeSet<i64>, links: &[ActivityLink]) -> BTreeSet<i64> {
    let mut closure = roots.clone();
    loop {
        let mut grew = false;
        for link in links {
            let Some(parent_id) = link.parent_id else {
                continue;
            };
            if closure.contains(&parent_id) && closure.insert(link.id) {
                grew = true;
            }
        }
        if !grew {
            break;
        }
    }
    closure
}
