//! Low-level wire encoding primitives
//!
//! Little-endian integers, Bitcoin CompactSize varints, and script data
//! pushes. Every serialized byte of a transaction flows through here, so
//! downstream decoders depend on these being bit-exact.

/// Encode a u64 as a CompactSize varint
pub fn write_varint(buf: &mut Vec<u8>, n: u64) {
    if n < 0xfd {
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(0xfd);
        buf.extend_from_slice(&(n as u16).to_le_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(0xfe);
        buf.extend_from_slice(&(n as u32).to_le_bytes());
    } else {
        buf.push(0xff);
        buf.extend_from_slice(&n.to_le_bytes());
    }
}

/// Append a minimal data-push operation for `data`
///
/// Lengths below 0x4c use the direct push opcode; larger payloads (a
/// many-key redeem script) use OP_PUSHDATA1 / OP_PUSHDATA2.
pub fn write_push(buf: &mut Vec<u8>, data: &[u8]) {
    let len = data.len();
    if len < 0x4c {
        buf.push(len as u8);
    } else if len <= 0xff {
        buf.push(0x4c); // OP_PUSHDATA1
        buf.push(len as u8);
    } else {
        buf.push(0x4d); // OP_PUSHDATA2
        buf.extend_from_slice(&(len as u16).to_le_bytes());
    }
    buf.extend_from_slice(data);
}
