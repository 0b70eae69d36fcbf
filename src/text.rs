use crate::config::Config;
use unicode_normalization::UnicodeNormalization;

/// Cleanup applied to extracted text before it is redacted and sent out.
pub fn normalize_extracted(cfg: &Config, raw: &str) -> String {
    let mut s = raw.to_string();

    if cfg.text.normalize_newlines {
        s = s.replace("\r\n", "\n").replace('\r', "\n");
    }

    if cfg.text.normalize_unicode {
        s = s.nfkc().collect::<String>();
    }

    sanitize_control_chars(&s, &cfg.text.control_chars_to_sanitize)
}

fn sanitize_control_chars(s: &str, codes: &[u8]) -> String {
    if codes.is_empty() {
        return s.to_string();
    }

    let mut mask = [false; 128];
    for &code in codes {
        if (code as usize) < mask.len() {
            mask[code as usize] = true;
        }
    }

    s.chars()
        .filter(|&ch| {
            // Keep line structure; the classifier reads layout from it.
            if ch == '\n' || ch == '\t' {
                return true;
            }
            let cp = ch as u32;
            if cp < 128 { !mask[cp as usize] } else { true }
        })
        .collect()
}
