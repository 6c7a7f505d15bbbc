use actix_web::{http::header::LOCATION, HttpResponse};
use unicode_segmentation::UnicodeSegmentation;

pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location))
        .finish()
}

/// Prints an error followed by each of its causes.
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    write!(f, "{e}")?;
    let mut current = e.source();
    while let Some(cause) = current {
        write!(f, " Caused by: {cause}")?;
        current = cause.source();
    }
    Ok(())
}

/// Masks the first half of a string, rounded up, with `*`.
pub fn obfuscate(s: &str) -> String {
    let graphemes: Vec<&str> = s.graphemes(true).collect();
    let hidden = graphemes.len().div_ceil(2);

    let mut obfuscated = "*".repeat(hidden);
    obfuscated.push_str(&graphemes[hidden..].concat());
    obfuscated
}
