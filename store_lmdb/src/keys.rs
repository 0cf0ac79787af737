//! Key encodings.
//!
//! Numeric ids are stored big-endian so LMDB's lexicographic key order is
//! numeric order, which makes a full scan return records in insertion order.

pub(crate) const LAST_LAWYER_ID: &[u8] = b"last_lawyer_id";
pub(crate) const LAST_REQUEST_ID: &[u8] = b"last_request_id";
pub(crate) const SCHEMA_VERSION: &[u8] = b"schema_version";

pub(crate) fn id_key(id: u64) -> [u8; 8] {
    id.to_be_bytes()
}

pub(crate) fn decode_id(bytes: &[u8]) -> Option<u64> {
    let arr: [u8; 8] = bytes.try_into().ok()?;
    Some(u64::from_be_bytes(arr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_endian_keys_sort_numerically() {
        let mut keys = vec![id_key(256), id_key(1), id_key(255), id_key(2)];
        keys.sort();
        let decoded: Vec<u64> = keys.iter().map(|k| decode_id(k).unwrap()).collect();
        assert_eq!(decoded, vec![1, 2, 255, 256]);
    }

    #[test]
    fn decode_rejects_wrong_length() {
        assert_eq!(decode_id(&[1, 2, 3]), None);
    }
}
