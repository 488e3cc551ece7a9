//! Binary snapshots of built graphs.
//!
//! A snapshot file is a 4-byte little-endian header length, a bincode
//! [`SnapshotHeader`], then the zlib-compressed bincode encoding of the
//! [`RrGraph`]. The header checksum covers the uncompressed payload, so it
//! doubles as the graph's fingerprint: two builds from the same inputs must
//! produce the same one.

use crate::error::RrGraphError;
use crate::graph::RrGraph;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;
use weft_common::ContentHash;

/// Magic bytes identifying a weft graph snapshot.
const SNAPSHOT_MAGIC: [u8; 4] = *b"WEFT";

/// Current snapshot format version. Increment on breaking changes to the
/// header or payload format.
const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Header prepended to every snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotHeader {
    /// Magic bytes: must be `b"WEFT"`.
    pub magic: [u8; 4],
    /// Snapshot format version.
    pub format_version: u32,
    /// Version of the crate that wrote the snapshot.
    pub weft_version: String,
    /// Content hash of the uncompressed payload.
    pub checksum: ContentHash,
}

/// A graph together with its encoded payload.
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    graph: RrGraph,
    payload: Vec<u8>,
    checksum: ContentHash,
}

fn encode(graph: &RrGraph) -> Result<Vec<u8>, RrGraphError> {
    bincode::serde::encode_to_vec(graph, bincode::config::standard()).map_err(|e| {
        RrGraphError::Serialization {
            reason: e.to_string(),
        }
    })
}

impl GraphSnapshot {
    /// Encodes `graph`.
    pub fn capture(graph: RrGraph) -> Result<Self, RrGraphError> {
        let payload = encode(&graph)?;
        let checksum = ContentHash::from_bytes(&payload);
        Ok(Self {
            graph,
            payload,
            checksum,
        })
    }

    /// The captured graph.
    pub fn graph(&self) -> &RrGraph {
        &self.graph
    }

    /// Consumes the snapshot, returning the graph.
    pub fn into_graph(self) -> RrGraph {
        self.graph
    }

    /// Hash of the encoded node, edge and lookup arrays.
    pub fn fingerprint(&self) -> ContentHash {
        self.checksum
    }

    /// Serializes the snapshot, header included.
    pub fn to_bytes(&self) -> Result<Vec<u8>, RrGraphError> {
        let header = SnapshotHeader {
            magic: SNAPSHOT_MAGIC,
            format_version: SNAPSHOT_FORMAT_VERSION,
            weft_version: env!("CARGO_PKG_VERSION").to_string(),
            checksum: self.checksum,
        };
        let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
            .map_err(|e| RrGraphError::Serialization {
                reason: e.to_string(),
            })?;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        let compressed = encoder
            .write_all(&self.payload)
            .and_then(|()| encoder.finish())
            .map_err(|e| RrGraphError::Serialization {
                reason: e.to_string(),
            })?;

        let mut output = Vec::with_capacity(4 + header_bytes.len() + compressed.len());
        output.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(&compressed);
        Ok(output)
    }

    /// Parses a snapshot read from `path`, validating magic, version and
    /// checksum.
    pub fn from_bytes(path: &Path, raw: &[u8]) -> Result<Self, RrGraphError> {
        let invalid = |reason: &str| RrGraphError::Snapshot {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };
        if raw.len() < 4 {
            return Err(invalid("file is truncated"));
        }
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&raw[..4]);
        let header_len = u32::from_le_bytes(len_bytes) as usize;
        if raw.len() < 4 + header_len {
            return Err(invalid("header is truncated"));
        }
        let (header, _): (SnapshotHeader, usize) =
            bincode::serde::decode_from_slice(&raw[4..4 + header_len], bincode::config::standard())
                .map_err(|e| invalid(&format!("bad header: {e}")))?;
        if header.magic != SNAPSHOT_MAGIC {
            return Err(invalid("not a weft snapshot"));
        }
        if header.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(invalid(&format!(
                "format version {} is not supported (expected {SNAPSHOT_FORMAT_VERSION})",
                header.format_version
            )));
        }

        let mut payload = Vec::new();
        ZlibDecoder::new(&raw[4 + header_len..])
            .read_to_end(&mut payload)
            .map_err(|e| invalid(&format!("bad payload: {e}")))?;
        if ContentHash::from_bytes(&payload) != header.checksum {
            return Err(invalid("checksum mismatch"));
        }
        let (graph, _): (RrGraph, usize) =
            bincode::serde::decode_from_slice(&payload, bincode::config::standard())
                .map_err(|e| invalid(&format!("bad graph: {e}")))?;
        Ok(Self {
            graph,
            payload,
            checksum: header.checksum,
        })
    }

    /// Writes the snapshot to `path`.
    pub fn write(&self, path: &Path) -> Result<(), RrGraphError> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes).map_err(|e| RrGraphError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Reads and validates the snapshot at `path`.
    pub fn read(path: &Path) -> Result<Self, RrGraphError> {
        let raw = std::fs::read(path).map_err(|e| RrGraphError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_bytes(path, &raw)
    }
}

/// Fingerprint of `graph` without keeping the snapshot.
pub fn fingerprint(graph: &RrGraph) -> Result<ContentHash, RrGraphError> {
    Ok(ContentHash::from_bytes(&encode(graph)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::tests::small_graph;
    use crate::graph::RrNodeKind;

    #[test]
    fn file_roundtrip_keeps_the_graph() {
        let (_, _, graph) = small_graph();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.weft");
        let snapshot = GraphSnapshot::capture(graph.clone()).unwrap();
        snapshot.write(&path).unwrap();

        let loaded = GraphSnapshot::read(&path).unwrap();
        assert_eq!(loaded.fingerprint(), snapshot.fingerprint());
        let g = loaded.into_graph();
        assert_eq!(g.nodes(), graph.nodes());
        assert_eq!(g.num_edges(), graph.num_edges());
        assert_eq!(g.lookup(), graph.lookup());
        assert_eq!(
            g.find(RrNodeKind::ChanX, 1, 0, 1),
            graph.find(RrNodeKind::ChanX, 1, 0, 1)
        );
    }

    #[test]
    fn fingerprint_tracks_graph_content() {
        let (_, _, a) = small_graph();
        let (_, _, mut b) = small_graph();
        assert_eq!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
        b.nodes[0].capacity += 1;
        assert_ne!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }

    #[test]
    fn corrupt_files_are_rejected() {
        let (_, _, graph) = small_graph();
        let bytes = GraphSnapshot::capture(graph).unwrap().to_bytes().unwrap();
        let path = Path::new("g.weft");

        let err = GraphSnapshot::from_bytes(path, &bytes[..2]).unwrap_err();
        assert!(err.to_string().contains("file is truncated"), "{err}");

        let mut bad_magic = bytes.clone();
        bad_magic[5] ^= 0xff;
        assert!(GraphSnapshot::from_bytes(path, &bad_magic).is_err());

        let mut bad_payload = bytes.clone();
        let last = bad_payload.len() - 1;
        bad_payload[last] ^= 0xff;
        assert!(GraphSnapshot::from_bytes(path, &bad_payload).is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GraphSnapshot::read(&dir.path().join("absent.weft")).unwrap_err();
        assert!(matches!(err, RrGraphError::Io { .. }));
    }
}
