use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::str;

use crate::error::{Error, Result};
use crate::reference::bencode_ref::{BencodeRef, Inner};
use crate::reference::decode_opt::BDecodeOpt;

pub fn decode(bytes: &[u8], pos: usize, opts: BDecodeOpt, depth: usize) -> Result<(BencodeRef<'_>, usize)> {
    if depth >= opts.max_recursion() {
        return Err(Error::RecursionLimitExceeded {
            pos,
            max: opts.max_recursion(),
        });
    }

    match peek_byte(bytes, pos)? {
        crate::INT_START => {
            let (value, next_pos) = decode_int(bytes, pos + 1, crate::BEN_END)?;
            Ok((Inner::Int(value, &bytes[pos..next_pos]).into(), next_pos))
        }
        crate::LIST_START => {
            let (value, next_pos) = decode_list(bytes, pos + 1, opts, depth)?;
            Ok((Inner::List(value, &bytes[pos..next_pos]).into(), next_pos))
        }
        crate::DICT_START => {
            let (value, next_pos) = decode_dict(bytes, pos + 1, opts, depth)?;
            Ok((Inner::Dict(value, &bytes[pos..next_pos]).into(), next_pos))
        }
        crate::BYTE_LEN_LOW..=crate::BYTE_LEN_HIGH => {
            // The buffer starts at the first length digit, not at the payload.
            let (value, next_pos) = decode_bytes(bytes, pos)?;
            Ok((Inner::Bytes(value, &bytes[pos..next_pos]).into(), next_pos))
        }
        _ => Err(Error::InvalidByte { pos }),
    }
}

fn decode_int(bytes: &[u8], pos: usize, delim: u8) -> Result<(i64, usize)> {
    let remainder = &bytes[pos..];

    let Some(relative_end_pos) = remainder.iter().position(|&n| n == delim) else {
        return Err(Error::UnterminatedInt { pos });
    };
    let int_bytes = &remainder[..relative_end_pos];

    if int_bytes.len() > 1 {
        // "-0" is invalid, and so is any zero padding ("03", "-03").
        match (int_bytes[0], int_bytes[1]) {
            (b'-', b'0') => return Err(Error::NegativeZeroInt { pos }),
            (b'0', _) => return Err(Error::ZeroPaddedInt { pos }),
            _ => (),
        }
    }

    let Ok(int_str) = str::from_utf8(int_bytes) else {
        return Err(Error::UnparsableInt { pos });
    };

    let next_pos = pos + relative_end_pos + 1;
    match int_str.parse::<i64>() {
        Ok(value) => Ok((value, next_pos)),
        Err(_) => Err(Error::UnparsableInt { pos }),
    }
}

fn decode_bytes(bytes: &[u8], pos: usize) -> Result<(&[u8], usize)> {
    let (num_bytes, start_pos) = decode_int(bytes, pos, crate::BYTE_LEN_END)?;

    if num_bytes < 0 {
        return Err(Error::NegativeLength { pos });
    }

    let num_bytes = usize::try_from(num_bytes).map_err(|_| Error::LengthOverflow { pos })?;

    if num_bytes > bytes[start_pos..].len() {
        return Err(Error::LengthOverflow { pos });
    }

    let next_pos = start_pos + num_bytes;
    Ok((&bytes[start_pos..next_pos], next_pos))
}

fn decode_list(bytes: &[u8], pos: usize, opts: BDecodeOpt, depth: usize) -> Result<(Vec<BencodeRef<'_>>, usize)> {
    let mut bencode_list = Vec::new();

    let mut curr_pos = pos;

    while peek_byte(bytes, curr_pos)? != crate::BEN_END {
        let (bencode, next_pos) = decode(bytes, curr_pos, opts, depth + 1)?;

        bencode_list.push(bencode);
        curr_pos = next_pos;
    }

    Ok((bencode_list, curr_pos + 1))
}

fn decode_dict(bytes: &[u8], pos: usize, opts: BDecodeOpt, depth: usize) -> Result<(BTreeMap<&[u8], BencodeRef<'_>>, usize)> {
    let mut bencode_dict = BTreeMap::new();

    let mut curr_pos = pos;

    while peek_byte(bytes, curr_pos)? != crate::BEN_END {
        let (key, next_pos) = decode_bytes(bytes, curr_pos)?;

        // Keys must appear in ascending raw-byte order.
        if opts.check_key_sort() {
            if let Some(last_key) = bencode_dict.keys().next_back() {
                if key < *last_key {
                    return Err(Error::UnsortedKeys {
                        pos: curr_pos,
                        key: key.to_vec(),
                    });
                }
            }
        }
        curr_pos = next_pos;

        let (value, next_pos) = decode(bytes, curr_pos, opts, depth + 1)?;
        match bencode_dict.entry(key) {
            Entry::Vacant(entry) => entry.insert(value),
            Entry::Occupied(_) => {
                return Err(Error::DuplicateKey {
                    pos: curr_pos,
                    key: key.to_vec(),
                })
            }
        };

        curr_pos = next_pos;
    }

    Ok((bencode_dict, curr_pos + 1))
}

fn peek_byte(bytes: &[u8], pos: usize) -> Result<u8> {
    bytes.get(pos).copied().ok_or(Error::UnexpectedEof { pos })
}
