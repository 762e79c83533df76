//! Persisted per-seed membership lists.
//!
//! Layout, native endian, no padding:
//!
//! ```text
//! count: i32
//! count x { member_count: i32, member_count x u32 }
//! ```
//!
//! Every variable-length block is preceded by its length. Readers in other
//! pipeline stages depend on this layout byte for byte.

use std::io::{Read, Write};
use std::mem::size_of;

use bytemuck::{Pod, Zeroable};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use static_assertions::const_assert_eq;

use crate::data::GrowableBag;
use crate::region_error::RegionError;

/// A length prefix as it sits on disk.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct WireLen(pub i32);

const_assert_eq!(size_of::<WireLen>(), 4);
const_assert_eq!(size_of::<u32>(), 4);

const PREFIX: usize = size_of::<WireLen>();
const MEMBER: usize = size_of::<u32>();

fn wire_len(n: usize, what: &str) -> Result<WireLen, RegionError> {
    i32::try_from(n)
        .map(WireLen)
        .map_err(|_| RegionError::Wire(format!("{what} {n} does not fit an i32 prefix")))
}

/// Exact encoded size of `lists`.
pub fn encoded_len<L: AsRef<[u32]>>(lists: &[L]) -> usize {
    PREFIX
        + lists
            .iter()
            .map(|l| PREFIX + MEMBER * l.as_ref().len())
            .sum::<usize>()
}

/// Serialize member lists in order.
pub fn encode<L: AsRef<[u32]>>(lists: &[L]) -> Result<Bytes, RegionError> {
    let mut buf = BytesMut::with_capacity(encoded_len(lists));
    buf.put_i32_ne(wire_len(lists.len(), "seed count")?.0);
    for list in lists {
        let members = list.as_ref();
        buf.put_i32_ne(wire_len(members.len(), "member count")?.0);
        buf.put_slice(bytemuck::cast_slice(members));
    }
    Ok(buf.freeze())
}

fn take_len(data: &mut &[u8], what: &str) -> Result<usize, RegionError> {
    if data.remaining() < PREFIX {
        return Err(RegionError::Wire(format!(
            "truncated {what}: need {PREFIX} bytes, have {}",
            data.remaining()
        )));
    }
    let n = data.get_i32_ne();
    usize::try_from(n).map_err(|_| RegionError::Wire(format!("negative {what} {n}")))
}

/// Parse a buffer written by [`encode`]; the whole buffer must be consumed.
pub fn decode(mut data: &[u8]) -> Result<Vec<GrowableBag<u32>>, RegionError> {
    let count = take_len(&mut data, "seed count")?;
    // Each seed needs at least its own prefix.
    if count > data.remaining() / PREFIX {
        return Err(RegionError::Wire(format!(
            "seed count {count} exceeds remaining {} bytes",
            data.remaining()
        )));
    }
    let mut lists = Vec::with_capacity(count);
    for seed in 0..count {
        let m = take_len(&mut data, "member count")?;
        if !m.checked_mul(MEMBER).is_some_and(|b| b <= data.remaining()) {
            return Err(RegionError::Wire(format!(
                "seed {seed}: {m} members overrun remaining {} bytes",
                data.remaining()
            )));
        }
        let mut members = vec![0u32; m];
        data.copy_to_slice(bytemuck::cast_slice_mut(&mut members));
        lists.push(members.into_iter().collect());
    }
    if data.has_remaining() {
        return Err(RegionError::Wire(format!(
            "{} trailing bytes after {count} seeds",
            data.remaining()
        )));
    }
    Ok(lists)
}

/// Encode and write to `w`; returns bytes written.
pub fn write_to<W: Write, L: AsRef<[u32]>>(w: &mut W, lists: &[L]) -> Result<usize, RegionError> {
    let bytes = encode(lists)?;
    w.write_all(&bytes)?;
    log::debug!("membership: wrote {} seeds, {} bytes", lists.len(), bytes.len());
    Ok(bytes.len())
}

/// Read `r` to the end and decode it.
pub fn read_from<R: Read>(r: &mut R) -> Result<Vec<GrowableBag<u32>>, RegionError> {
    let mut raw = Vec::new();
    r.read_to_end(&mut raw)?;
    decode(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join(parts: &[&[u8]]) -> Vec<u8> {
        parts.concat()
    }

    #[test]
    fn layout_is_length_prefixed_native_endian() {
        let lists: Vec<Vec<u32>> = vec![vec![7, 9], vec![]];
        let got = encode(&lists).unwrap();
        let want = join(&[
            &2i32.to_ne_bytes(),
            &2i32.to_ne_bytes(),
            &7u32.to_ne_bytes(),
            &9u32.to_ne_bytes(),
            &0i32.to_ne_bytes(),
        ]);
        assert_eq!(&got[..], &want[..]);
        assert_eq!(encoded_len(&lists), want.len());
    }

    #[test]
    fn decode_reads_back_lists() {
        let lists: Vec<Vec<u32>> = vec![vec![1, 2, 3], vec![], vec![u32::MAX]];
        let back = decode(&encode(&lists).unwrap()).unwrap();
        let back: Vec<&[u32]> = back.iter().map(|b| b.as_slice()).collect();
        assert_eq!(back, vec![&[1, 2, 3][..], &[][..], &[u32::MAX][..]]);
    }

    #[test]
    fn empty_input_is_a_single_prefix() {
        let lists: [&[u32]; 0] = [];
        assert_eq!(&encode(&lists).unwrap()[..], &0i32.to_ne_bytes());
        assert!(decode(&0i32.to_ne_bytes()).unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_buffers() {
        assert!(matches!(decode(&[1, 0]), Err(RegionError::Wire(_))));
        assert!(matches!(decode(&(-1i32).to_ne_bytes()), Err(RegionError::Wire(_))));
        let overrun = join(&[&1i32.to_ne_bytes(), &5i32.to_ne_bytes(), &1u32.to_ne_bytes()]);
        assert!(matches!(decode(&overrun), Err(RegionError::Wire(_))));
        let trailing = join(&[&0i32.to_ne_bytes(), &[0xAB]]);
        assert!(matches!(decode(&trailing), Err(RegionError::Wire(_))));
        let huge = join(&[&i32::MAX.to_ne_bytes()]);
        assert!(matches!(decode(&huge), Err(RegionError::Wire(_))));
    }

    #[test]
    fn stream_round_trip() {
        let lists: Vec<GrowableBag<u32>> = vec![[4u32, 5].into_iter().collect()];
        let mut sink = Vec::new();
        let n = write_to(&mut sink, &lists).unwrap();
        assert_eq!(n, sink.len());
        let back = read_from(&mut sink.as_slice()).unwrap();
        assert_eq!(back[0].as_slice(), &[4, 5]);
    }
}
