/// Rewrites grace subscript/superscript escapes into caret/underscore form.
///
/// `\sXX\N` becomes `_{XX}` and `\SXX\N` becomes `^{XX}`; anything else,
/// including an unterminated escape, is kept as written.
pub fn unescape_grace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        let open = match tail.as_bytes().first() {
            Some(b's') => "_{",
            Some(b'S') => "^{",
            _ => {
                out.push('\\');
                rest = tail;
                continue;
            }
        };
        let body = &tail[1..];
        match body.find("\\N") {
            Some(end) => {
                out.push_str(open);
                out.push_str(&body[..end]);
                out.push('}');
                rest = &body[end + 2..];
            }
            None => {
                out.push('\\');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}
