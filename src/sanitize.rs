const ID_PREFIX: char = 'N';
const PLACEHOLDER: char = '_';

// Not injective: `a-b` and `a.b` both become `Na_b`.
pub fn sanitize_id(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 1);
    out.push(ID_PREFIX);
    out.extend(
        raw.chars()
            .map(|c| if c.is_alphanumeric() { c } else { PLACEHOLDER }),
    );
    out
}

pub fn escape_label(label: &str) -> String {
    label.replace('"', "\\\"")
}
