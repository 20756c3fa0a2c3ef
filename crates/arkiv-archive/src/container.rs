//! Byte layout of the secure archive container.
//!
//! ```text
//! [4 bytes: magic "ARKV"]
//! [4 bytes: version (big-endian u32)]
//! [4 bytes: entry count (big-endian u32), always 5]
//! per entry, in fixed order:
//!   [2 bytes: name length (big-endian u16)]
//!   [name bytes (UTF-8)]
//!   [8 bytes: data length (big-endian u64)]
//!   [data bytes]
//! [64 bytes: SHA-512 over everything above]
//! ```
//!
//! Entry order is part of the external contract: `data.txt`,
//! `merkleTree.json`, `token.tsp`, `computing_information.txt`,
//! `additional_information.txt`. The trailing digest doubles as the
//! content address of the archive in the object store.

use sha2::{Digest, Sha512};

use arkiv_crypto::MerkleTree;

use crate::archive::SecureArchive;
use crate::error::{ArchiveError, ArchiveResult};
use crate::properties::{AdditionalInformation, ComputingInformation};

const MAGIC: &[u8; 4] = b"ARKV";
const VERSION: u32 = 1;
const CHECKSUM_LEN: usize = 64;

/// The five entry names, in their mandatory order.
pub const ENTRY_NAMES: [&str; 5] = [
    "data.txt",
    "merkleTree.json",
    "token.tsp",
    "computing_information.txt",
    "additional_information.txt",
];

impl SecureArchive {
    /// Serialize to container bytes.
    pub fn to_bytes(&self) -> ArchiveResult<Vec<u8>> {
        let merkle_json = serde_json::to_vec(&self.merkle_tree)
            .map_err(|e| ArchiveError::Serialization(e.to_string()))?;
        let computing = self.computing.to_properties().into_bytes();
        let additional = self.additional.to_properties().into_bytes();
        let entries: [&[u8]; 5] = [
            &self.data,
            &merkle_json,
            &self.token,
            &computing,
            &additional,
        ];

        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&VERSION.to_be_bytes());
        out.extend_from_slice(&(ENTRY_NAMES.len() as u32).to_be_bytes());

        for (name, data) in ENTRY_NAMES.iter().zip(entries) {
            out.extend_from_slice(&(name.len() as u16).to_be_bytes());
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(&(data.len() as u64).to_be_bytes());
            out.extend_from_slice(data);
        }

        let checksum = Sha512::digest(&out);
        out.extend_from_slice(&checksum);
        Ok(out)
    }

    /// Content address of the serialized archive: hex of the trailing digest.
    pub fn content_address(&self) -> ArchiveResult<String> {
        let bytes = self.to_bytes()?;
        Ok(hex::encode(&bytes[bytes.len() - CHECKSUM_LEN..]))
    }

    /// Parse container bytes, enforcing magic, version, checksum, and the
    /// fixed entry order.
    pub fn from_bytes(bytes: &[u8]) -> ArchiveResult<Self> {
        if bytes.len() < 12 + CHECKSUM_LEN {
            return Err(ArchiveError::Corrupt {
                offset: 0,
                reason: "container too short".into(),
            });
        }

        let (body, trailer) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
        if Sha512::digest(body).as_slice() != trailer {
            return Err(ArchiveError::ChecksumMismatch);
        }

        if &body[0..4] != MAGIC {
            return Err(ArchiveError::InvalidMagic {
                expected: String::from_utf8_lossy(MAGIC).into_owned(),
                actual: String::from_utf8_lossy(&body[0..4]).into_owned(),
            });
        }
        let version = u32::from_be_bytes(body[4..8].try_into().unwrap_or_default());
        if version != VERSION {
            return Err(ArchiveError::UnsupportedVersion(version));
        }
        let count = u32::from_be_bytes(body[8..12].try_into().unwrap_or_default()) as usize;
        if count != ENTRY_NAMES.len() {
            return Err(ArchiveError::Corrupt {
                offset: 8,
                reason: format!("expected {} entries, found {count}", ENTRY_NAMES.len()),
            });
        }

        let mut pos = 12;
        let mut entries: Vec<Vec<u8>> = Vec::with_capacity(count);
        for (index, expected) in ENTRY_NAMES.iter().enumerate() {
            let name = read_name(body, &mut pos)?;
            if name != *expected {
                return Err(ArchiveError::EntryOutOfOrder {
                    index,
                    expected: expected.to_string(),
                    actual: name,
                });
            }
            entries.push(read_data(body, &mut pos)?);
        }

        let mut entries = entries.into_iter();
        let data = entries.next().unwrap_or_default();
        let merkle_bytes = entries.next().unwrap_or_default();
        let token = entries.next().unwrap_or_default();
        let computing_bytes = entries.next().unwrap_or_default();
        let additional_bytes = entries.next().unwrap_or_default();

        let merkle_tree: MerkleTree = serde_json::from_slice(&merkle_bytes)
            .map_err(|e| ArchiveError::Serialization(e.to_string()))?;
        let computing =
            ComputingInformation::from_properties(&String::from_utf8_lossy(&computing_bytes))?;
        let additional =
            AdditionalInformation::from_properties(&String::from_utf8_lossy(&additional_bytes))?;

        Ok(Self {
            data,
            merkle_tree,
            token,
            computing,
            additional,
        })
    }
}

fn read_name(body: &[u8], pos: &mut usize) -> ArchiveResult<String> {
    let len_end = *pos + 2;
    if len_end > body.len() {
        return Err(truncated(*pos));
    }
    let len = u16::from_be_bytes(body[*pos..len_end].try_into().unwrap_or_default()) as usize;
    let end = len_end + len;
    if end > body.len() {
        return Err(truncated(*pos));
    }
    let name = String::from_utf8_lossy(&body[len_end..end]).into_owned();
    *pos = end;
    Ok(name)
}

fn read_data(body: &[u8], pos: &mut usize) -> ArchiveResult<Vec<u8>> {
    let len_end = *pos + 8;
    if len_end > body.len() {
        return Err(truncated(*pos));
    }
    let len = u64::from_be_bytes(body[*pos..len_end].try_into().unwrap_or_default()) as usize;
    let end = len_end.checked_add(len).ok_or_else(|| truncated(*pos))?;
    if end > body.len() {
        return Err(truncated(*pos));
    }
    let data = body[len_end..end].to_vec();
    *pos = end;
    Ok(data)
}

fn truncated(offset: usize) -> ArchiveError {
    ArchiveError::Corrupt {
        offset,
        reason: "entry extends beyond container".into(),
    }
}
