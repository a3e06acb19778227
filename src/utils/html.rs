use quick_xml::escape::partial_escape;

/// Escapes `&`, `<` and `>` so text can be placed inside element content.
pub fn escape_html(text: &str) -> String {
    partial_escape(text).into_owned()
}
