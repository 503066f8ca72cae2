use crate::access::dict::BDictAccess;
use crate::access::list::BListAccess;

/// Read-only view over one of the four bencode shapes.
pub enum RefKind<'a, K, V> {
    /// Bencode integer.
    Int(i64),
    /// Bencode byte string.
    Bytes(&'a [u8]),
    /// Bencode list.
    List(&'a dyn BListAccess<V>),
    /// Bencode dictionary.
    Dict(&'a dyn BDictAccess<K, V>),
}

/// Read access to a bencode value.
pub trait BRefAccess: Sized {
    type BKey;
    type BType: BRefAccess<BKey = Self::BKey>;

    /// Access the value as a [`RefKind`].
    fn kind(&self) -> RefKind<'_, Self::BKey, Self::BType>;

    /// Access the value as a `str`, if it is a valid UTF-8 byte string.
    fn str(&self) -> Option<&str>;

    /// Access the value as an `i64`.
    fn int(&self) -> Option<i64>;

    /// Access the value as a byte string.
    fn bytes(&self) -> Option<&[u8]>;

    /// Access the value as a list.
    fn list(&self) -> Option<&dyn BListAccess<Self::BType>>;

    /// Access the value as a dictionary.
    fn dict(&self) -> Option<&dyn BDictAccess<Self::BKey, Self::BType>>;
}

impl<'a, T> BRefAccess for &'a T
where
    T: BRefAccess,
{
    type BKey = T::BKey;
    type BType = T::BType;

    fn kind(&self) -> RefKind<'_, Self::BKey, Self::BType> {
        (*self).kind()
    }

    fn str(&self) -> Option<&str> {
        (*self).str()
    }

    fn int(&self) -> Option<i64> {
        (*self).int()
    }

    fn bytes(&self) -> Option<&[u8]> {
        (*self).bytes()
    }

    fn list(&self) -> Option<&dyn BListAccess<Self::BType>> {
        (*self).list()
    }

    fn dict(&self) -> Option<&dyn BDictAccess<Self::BKey, Self::BType>> {
        (*self).dict()
    }
}

/// Mutable view over one of the four bencode shapes.
pub enum MutKind<'a, K, V> {
    /// Bencode integer.
    Int(i64),
    /// Bencode byte string.
    Bytes(&'a [u8]),
    /// Bencode list.
    List(&'a mut dyn BListAccess<V>),
    /// Bencode dictionary.
    Dict(&'a mut dyn BDictAccess<K, V>),
}

/// Write access to a bencode value.
pub trait BMutAccess: Sized + BRefAccess {
    /// Access the value as a [`MutKind`].
    fn kind_mut(&mut self) -> MutKind<'_, Self::BKey, Self::BType>;

    /// Access the value as a mutable list.
    fn list_mut(&mut self) -> Option<&mut dyn BListAccess<Self::BType>>;

    /// Access the value as a mutable dictionary.
    fn dict_mut(&mut self) -> Option<&mut dyn BDictAccess<Self::BKey, Self::BType>>;
}
