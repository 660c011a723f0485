//! Form field encodings.

/// How form values are passed to curl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormType {
    /// `application/x-www-form-urlencoded`: one `-d "k=v&k2=v2"` token.
    Urlencoded,

    /// `multipart/form-data`: one `-F 'k=v'` token per field.
    Multipart,
}
