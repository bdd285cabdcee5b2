//! Directory-name sanitization for bundle names.

use percent_encoding::percent_decode_str;

/// Sanitizes a candidate bundle name for use as a single directory name.
///
/// - Percent escapes are decoded first (`space%20run` → `space run`)
/// - Path separators, NUL, control characters and whitespace become `_`
/// - Consecutive underscores collapse; leading/trailing dots, spaces and `_` are trimmed
/// - Length is limited to 255 bytes (Linux NAME_MAX)
pub fn sanitize_dir_name(name: &str) -> String {
    const NAME_MAX: usize = 255;

    let decoded = percent_decode_str(name).decode_utf8_lossy();
    let mut out = String::with_capacity(decoded.len());
    let mut prev_underscore = false;

    for c in decoded.chars() {
        let bad = c == '/' || c == '\\' || c.is_control() || c.is_whitespace();
        let c = if bad { '_' } else { c };
        if c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_' || c == ' ');
    let mut take = trimmed.len().min(NAME_MAX);
    while take > 0 && !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trimmed[..take].to_string()
}
