use std::borrow::Cow;

/// Conversion of owned and borrowed byte-ish types into `Cow<[u8]>`.
///
/// `&str` and `String` have no `From` implementation into `Cow<'_, [u8]>`, and
/// going through `AsRef<[u8]>` would silently borrow owned arguments. This
/// trait keeps the construction macros intuitive: borrowed types stay
/// borrowed, owned types stay owned.
pub trait BCowConvert<'a> {
    fn convert(self) -> Cow<'a, [u8]>;
}

impl<'a> BCowConvert<'a> for &'a [u8] {
    fn convert(self) -> Cow<'a, [u8]> {
        self.into()
    }
}

impl<'a> BCowConvert<'a> for &'a str {
    fn convert(self) -> Cow<'a, [u8]> {
        self.as_bytes().into()
    }
}

impl BCowConvert<'static> for String {
    fn convert(self) -> Cow<'static, [u8]> {
        self.into_bytes().into()
    }
}

impl BCowConvert<'static> for Vec<u8> {
    fn convert(self) -> Cow<'static, [u8]> {
        self.into()
    }
}
