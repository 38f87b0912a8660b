//! Splitting a data key into per-group shares, and reconstructing it.
//!
//! `sharks::Share` serializes as `x_coordinate(1 byte) || y_value(n bytes)`,
//! with `y_value` the same length as the secret being split. Since
//! [`sops_masterkey::MasterKey::encrypt`]/`decrypt` are typed around a
//! fixed 32-byte [`DataKey`], only the y-value travels through a master
//! key's wrap/unwrap; the x-coordinate is carried alongside in
//! [`sops_types::KeyGroup::share_index`] and reattached here before
//! handing shares back to `sharks` for recovery.

use crate::error::ShamirError;
use sharks::{Share, Sharks};
use sops_types::{DataKey, DATA_KEY_LEN};

/// One group's share of a split data key.
pub struct GroupShare {
    /// `None` only for the implicit single-group, no-splitting case.
    pub share_index: Option<u8>,
    pub data_key: DataKey,
}

fn clone_data_key(data_key: &DataKey) -> DataKey {
    DataKey::from_bytes(data_key.with_bytes(|b| *b))
}

/// Split `data_key` into `group_count` shares reconstructable from any
/// `threshold` of them.
///
/// `threshold <= 1` (unset or explicit 1) means no real splitting: every
/// group gets the whole data key, `share_index` stays `None`, and any
/// single group's own master keys can recover it directly. This is the
/// classic "every master key wraps the full key" behavior preserved for
/// documents with no `shamir-threshold` configured.
pub fn split(
    data_key: &DataKey,
    group_count: usize,
    threshold: u8,
) -> Result<Vec<GroupShare>, ShamirError> {
    if group_count == 0 {
        return Err(ShamirError::EmptyKeyGroup);
    }

    if threshold <= 1 {
        return Ok((0..group_count)
            .map(|_| GroupShare {
                share_index: None,
                data_key: clone_data_key(data_key),
            })
            .collect());
    }

    let secret = data_key.with_bytes(|b| b.to_vec());
    let sharks = Sharks(threshold);
    let shares: Vec<Share> = sharks.dealer(&secret).take(group_count).collect();

    shares
        .iter()
        .map(|share| {
            let serialized: Vec<u8> = Vec::from(share);
            let (x_byte, y_bytes) = serialized
                .split_first()
                .expect("sharks::Share serializes with a leading x-coordinate byte");
            let data_key = DataKey::from_slice(y_bytes)
                .map_err(|e| ShamirError::Other(Box::new(e)))?;
            debug_assert_eq!(y_bytes.len(), DATA_KEY_LEN);
            Ok(GroupShare {
                share_index: Some(*x_byte),
                data_key,
            })
        })
        .collect()
}

/// Reconstruct the data key from at least `threshold` recovered
/// `(share_index, y_value)` pairs.
pub fn recover(
    recovered: &[(u8, DataKey)],
    threshold: u8,
) -> Result<DataKey, ShamirError> {
    if (recovered.len() as u8) < threshold {
        return Err(ShamirError::InsufficientShares {
            recovered: recovered.len(),
            required: threshold as usize,
        });
    }

    let shares: Vec<Share> = recovered
        .iter()
        .map(|(x, y)| {
            let mut bytes = Vec::with_capacity(1 + DATA_KEY_LEN);
            bytes.push(*x);
            y.with_bytes(|b| bytes.extend_from_slice(b));
            Share::try_from(bytes.as_slice())
                .map_err(|e| ShamirError::Other(format!("{e}").into()))
        })
        .collect::<Result<_, _>>()?;

    let sharks = Sharks(threshold);
    let secret = sharks
        .recover(&shares)
        .map_err(|e| ShamirError::Other(format!("{e}").into()))?;
    DataKey::from_slice(&secret).map_err(|e| ShamirError::Other(Box::new(e)))
}
