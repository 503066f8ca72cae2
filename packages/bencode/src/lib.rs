//! Bencode parsing and construction.
//!
//! The decoder is zero-copy: [`BencodeRef`] borrows the input buffer and every
//! decoded value knows the exact byte range it was decoded from (see
//! [`BencodeRef::buffer`]). That byte range is what callers hash when they
//! need the canonical bytes of a substructure, e.g. a torrent's `info`
//! dictionary.
//!
//! The encoder is deterministic: dictionary keys are always emitted in
//! ascending raw-byte order, so `encode(decode(x)) == x` for any input
//! accepted by the strict decoder.
//!
//! Decoding:
//!
//! ```rust
//! use ttorrent_bencode::{BencodeRef, BRefAccess, BDecodeOpt};
//!
//! let data = b"d8:intervali60ee";
//! let bencode = BencodeRef::decode(data, BDecodeOpt::default()).unwrap();
//!
//! assert_eq!(60, bencode.dict().unwrap().lookup(b"interval").unwrap().int().unwrap());
//! ```
//!
//! Encoding:
//!
//! ```rust
//! use ttorrent_bencode::{ben_bytes, ben_int, ben_map};
//!
//! let message = (ben_map! {
//!     "interval" => ben_int!(60),
//!     "ip" => ben_bytes!("127.0.0.1")
//! })
//! .encode();
//!
//! assert_eq!(&b"d8:intervali60e2:ip9:127.0.0.1e"[..], &message[..]);
//! ```

mod access;
mod cow;
mod error;
mod mutable;
mod reference;

/// Traits used by the construction macros.
pub mod inner {
    pub use crate::cow::BCowConvert;
}

pub use crate::access::bencode::{BMutAccess, BRefAccess, MutKind, RefKind};
pub use crate::access::dict::BDictAccess;
pub use crate::access::list::BListAccess;
pub use crate::error::{Error, Result};
pub use crate::mutable::bencode_mut::BencodeMut;
pub use crate::reference::bencode_ref::BencodeRef;
pub use crate::reference::decode_opt::BDecodeOpt;

const BEN_END: u8 = b'e';
const DICT_START: u8 = b'd';
const LIST_START: u8 = b'l';
const INT_START: u8 = b'i';

const BYTE_LEN_LOW: u8 = b'0';
const BYTE_LEN_HIGH: u8 = b'9';
const BYTE_LEN_END: u8 = b':';

/// Construct a `BencodeMut` dictionary from key/value pairs.
///
/// Keys may be anything convertible to bytes; values are `BencodeMut`.
#[macro_export]
macro_rules! ben_map {
    ( $($key:expr => $val:expr),* ) => {
        {
            use $crate::inner::BCowConvert;
            use $crate::{BMutAccess, BencodeMut};

            let mut bencode_map = BencodeMut::new_dict();
            {
                let map = bencode_map.dict_mut().unwrap();
                $(
                    map.insert(BCowConvert::convert($key), $val);
                )*
            }

            bencode_map
        }
    }
}

/// Construct a `BencodeMut` list from a sequence of `BencodeMut` values.
#[macro_export]
macro_rules! ben_list {
    ( $($ben:expr),* ) => {
        {
            use $crate::{BMutAccess, BencodeMut};

            let mut bencode_list = BencodeMut::new_list();
            {
                let list = bencode_list.list_mut().unwrap();
                $(
                    list.push($ben);
                )*
            }

            bencode_list
        }
    }
}

/// Construct `BencodeMut` bytes from anything convertible to a byte buffer.
#[macro_export]
macro_rules! ben_bytes {
    ( $ben:expr ) => {{
        use $crate::inner::BCowConvert;
        use $crate::BencodeMut;

        BencodeMut::new_bytes(BCowConvert::convert($ben))
    }};
}

/// Construct a `BencodeMut` integer from an `i64`.
#[macro_export]
macro_rules! ben_int {
    ( $ben:expr ) => {{
        use $crate::BencodeMut;

        BencodeMut::new_int($ben)
    }};
}
