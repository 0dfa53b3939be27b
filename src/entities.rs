pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match entity_at(rest) {
            Some((ch, len)) => {
                out.push(ch);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

// `s` starts with '&'; returns the decoded char and the byte length consumed.
fn entity_at(s: &str) -> Option<(char, usize)> {
    let semi = s[1..].find(';')?;
    if semi == 0 || semi > 10 {
        return None;
    }
    let body = &s[1..=semi];
    if !body.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '#') {
        return None;
    }
    let ch = match body.strip_prefix('#') {
        Some(num) => numeric(num)?,
        None => named(body)?,
    };
    Some((ch, semi + 2))
}

fn numeric(num: &str) -> Option<char> {
    let code = if let Some(hex) = num.strip_prefix(['x', 'X']) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        num.parse::<u32>().ok()?
    };
    char::from_u32(code)
}

fn named(name: &str) -> Option<char> {
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{00A0}',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "euro" => '€',
        "pound" => '£',
        "yen" => '¥',
        "times" => '×',
        "divide" => '÷',
        "minus" => '−',
        "plusmn" => '±',
        "ndash" => '–',
        "mdash" => '—',
        "hellip" => '…',
        _ => return None,
    };
    Some(ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_entities() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt;"), "a & b <c>");
        assert_eq!(decode_entities("&mdash;&hellip;"), "—…");
    }

    #[test]
    fn numeric_entities() {
        assert_eq!(decode_entities("&#65;&#x42;&#x63;"), "ABc");
    }

    #[test]
    fn unterminated_ampersand_is_literal() {
        assert_eq!(decode_entities("fish & chips"), "fish & chips");
        assert_eq!(decode_entities("trailing &"), "trailing &");
    }

    #[test]
    fn unknown_entity_is_kept_verbatim() {
        assert_eq!(
            decode_entities("&bogus; &toolongtodecode;"),
            "&bogus; &toolongtodecode;"
        );
    }

    #[test]
    fn double_ampersand() {
        assert_eq!(decode_entities("&&amp;"), "&&");
    }
}
