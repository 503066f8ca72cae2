use std::collections::BTreeMap;
use std::str;

use crate::access::bencode::{BRefAccess, RefKind};
use crate::access::dict::BDictAccess;
use crate::access::list::BListAccess;
use crate::error::{Error, Result};
use crate::reference::decode;
use crate::reference::decode_opt::BDecodeOpt;

/// A decoded bencode value together with the input bytes it was decoded from.
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum Inner<'a> {
    /// Bencode integer.
    Int(i64, &'a [u8]),
    /// Bencode byte string.
    Bytes(&'a [u8], &'a [u8]),
    /// Bencode list.
    List(Vec<BencodeRef<'a>>, &'a [u8]),
    /// Bencode dictionary.
    Dict(BTreeMap<&'a [u8], BencodeRef<'a>>, &'a [u8]),
}

impl<'a> From<Inner<'a>> for BencodeRef<'a> {
    fn from(inner: Inner<'a>) -> Self {
        BencodeRef { inner }
    }
}

/// Bencode value borrowing the buffer it was decoded from.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct BencodeRef<'a> {
    inner: Inner<'a>,
}

impl<'a> BencodeRef<'a> {
    /// Decode the given bytes with the given options.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the bytes are not structurally valid bencode,
    /// or when they are followed by trailing garbage and the options enforce a
    /// full decode.
    pub fn decode(bytes: &'a [u8], opts: BDecodeOpt) -> Result<BencodeRef<'a>> {
        let (bencode, end_pos) = decode::decode(bytes, 0, opts, 0)?;

        if end_pos != bytes.len() && opts.enforce_full_decode() {
            return Err(Error::TrailingBytes { pos: end_pos });
        }

        Ok(bencode)
    }

    /// Re-encode the value into its canonical bencoded form.
    ///
    /// Dictionary keys are emitted in sorted order, so for inputs accepted by
    /// a strict decode this returns the input bytes unchanged.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buffer = Vec::new();

        crate::mutable::encode::encode(self, &mut buffer);

        buffer
    }

    /// The exact input byte range this value was decoded from.
    ///
    /// For a nested value this is the canonical bencoded form of that
    /// substructure as it appeared in the input, which is what gets hashed
    /// when deriving a torrent's info-hash.
    #[must_use]
    pub fn buffer(&self) -> &'a [u8] {
        match self.inner {
            Inner::Int(_, buffer) | Inner::Bytes(_, buffer) | Inner::List(_, buffer) | Inner::Dict(_, buffer) => buffer,
        }
    }
}

impl<'a> BRefAccess for BencodeRef<'a> {
    type BKey = &'a [u8];
    type BType = BencodeRef<'a>;

    fn kind<'b>(&'b self) -> RefKind<'b, &'a [u8], BencodeRef<'a>> {
        match self.inner {
            Inner::Int(n, _) => RefKind::Int(n),
            Inner::Bytes(n, _) => RefKind::Bytes(n),
            Inner::List(ref n, _) => RefKind::List(n),
            Inner::Dict(ref n, _) => RefKind::Dict(n),
        }
    }

    fn str(&self) -> Option<&str> {
        let bytes = self.bytes()?;

        str::from_utf8(bytes).ok()
    }

    fn int(&self) -> Option<i64> {
        match self.inner {
            Inner::Int(n, _) => Some(n),
            _ => None,
        }
    }

    fn bytes(&self) -> Option<&[u8]> {
        match self.inner {
            Inner::Bytes(n, _) => Some(n),
            _ => None,
        }
    }

    fn list(&self) -> Option<&dyn BListAccess<BencodeRef<'a>>> {
        match self.inner {
            Inner::List(ref n, _) => Some(n),
            _ => None,
        }
    }

    fn dict(&self) -> Option<&dyn BDictAccess<&'a [u8], BencodeRef<'a>>> {
        match self.inner {
            Inner::Dict(ref n, _) => Some(n),
            _ => None,
        }
    }
}
