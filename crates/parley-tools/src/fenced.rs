/// Body of the first closed fence whose info string starts with `lang` (ASCII case-insensitive).
///
/// Fences are recognized at the start of a line. The closing marker may trail the last
/// body line. Blank bodies count as no block.
#[must_use]
pub fn first_fenced_block<'a>(text: &'a str, lang: &str) -> Option<&'a str> {
    let mut offset = 0;
    let mut body_start = None;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        match body_start {
            None => {
                if let Some(info) = line.trim().strip_prefix("```")
                    && info
                        .split_whitespace()
                        .next()
                        .is_some_and(|tag| tag.eq_ignore_ascii_case(lang))
                {
                    body_start = Some(offset);
                }
            }
            Some(start) => {
                if let Some(close) = line.find("```") {
                    let body = text[start..line_start + close].trim();
                    return (!body.is_empty()).then_some(body);
                }
            }
        }
    }

    None
}
