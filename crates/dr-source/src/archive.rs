//! Zip archive → fragments.
//!
//! Entries are walked in archive order.  An entry is a node fragment if its
//! file name (the part after the last `/`) starts with the node prefix and
//! ends in `.json`; likewise for edges.  Directories and other files are
//! ignored.

use std::io::Cursor;

use crate::config::FRAGMENT_EXTENSION;
use crate::fetch::{MAX_PAYLOAD_BYTES, read_capped};
use crate::fragments::{Fragment, FragmentSet};
use crate::{SourceError, SourceResult};

/// Split an in-memory zip archive into node and edge fragments.
///
/// `location` only labels errors.
pub fn read_archive(
    location:    &str,
    bytes:       Vec<u8>,
    node_prefix: &str,
    edge_prefix: &str,
) -> SourceResult<FragmentSet> {
    let archive_err = |reason: String| SourceError::Archive {
        location: location.to_owned(),
        reason,
    };

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| archive_err(e.to_string()))?;

    let mut set = FragmentSet::default();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| archive_err(e.to_string()))?;
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_owned();
        let file_name = name.rsplit('/').next().unwrap_or(&name);
        if !file_name.ends_with(FRAGMENT_EXTENSION) {
            continue;
        }
        let is_node = file_name.starts_with(node_prefix);
        let is_edge = file_name.starts_with(edge_prefix);
        if !is_node && !is_edge {
            tracing::debug!(entry = %name, "archive entry matches no prefix; skipped");
            continue;
        }

        // The size in the entry header is not trusted for allocation.
        let payload = read_capped(&mut entry, MAX_PAYLOAD_BYTES)
            .map_err(|reason| archive_err(format!("{name}: {reason}")))?;

        // A prefix that is itself a prefix of the other ("n" vs "nodes")
        // resolves to the longer match.
        let fragment = Fragment { name, payload };
        if is_node && (!is_edge || node_prefix.len() >= edge_prefix.len()) {
            set.nodes.push(fragment);
        } else {
            set.edges.push(fragment);
        }
    }

    if set.nodes.is_empty() {
        return Err(SourceError::NoFragments { what: "node", location: location.to_owned() });
    }
    Ok(set)
}
