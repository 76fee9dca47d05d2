//! Display pattern translation
//!
//! Field metadata describes date and time display formats with letter
//! patterns (`dd/MM/yyyy`). The target language uses picture strings
//! (`[D01]/[M01]/[Y0001]`), so patterns are rewritten token by token.

use crate::common::{TranslateError, TranslateResult};

/// Translate a letter pattern into a picture string
pub fn picture_string(pattern: &str) -> TranslateResult<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\'' => {
                // Quoted literal; '' is a single quote
                i += 1;
                if chars.get(i) == Some(&'\'') {
                    out.push('\'');
                    i += 1;
                    continue;
                }
                while i < chars.len() {
                    if chars[i] == '\'' {
                        if chars.get(i + 1) == Some(&'\'') {
                            out.push('\'');
                            i += 2;
                            continue;
                        }
                        break;
                    }
                    push_literal(&mut out, chars[i]);
                    i += 1;
                }
                if i >= chars.len() {
                    return Err(TranslateError::Metadata {
                        message: format!("unterminated quote in display pattern '{}'", pattern),
                    });
                }
                i += 1;
            }
            c if c.is_ascii_alphabetic() => {
                let run = chars[i..].iter().take_while(|&&d| d == c).count();
                out.push_str(&component(c, run, pattern)?);
                i += run;
            }
            c => {
                push_literal(&mut out, c);
                i += 1;
            }
        }
    }
    Ok(out)
}

fn push_literal(out: &mut String, c: char) {
    match c {
        '[' => out.push_str("[["),
        ']' => out.push_str("]]"),
        c => out.push(c),
    }
}

/// Zero-padded presentation: 1 → `1`, 2 → `01`, 4 → `0001`
fn padded(width: usize) -> String {
    format!("{}1", "0".repeat(width.saturating_sub(1)))
}

fn component(letter: char, run: usize, pattern: &str) -> TranslateResult<String> {
    let picture = match letter {
        'y' => format!("[Y{}]", padded(run)),
        'M' if run >= 4 => "[MNn]".to_string(),
        'M' if run == 3 => "[MNn,*-3]".to_string(),
        'M' => format!("[M{}]", padded(run)),
        'd' => format!("[D{}]", padded(run)),
        'H' => format!("[H{}]", padded(run)),
        'h' => format!("[h{}]", padded(run)),
        'm' => format!("[m{}]", padded(run)),
        's' => format!("[s{}]", padded(run)),
        'E' if run >= 4 => "[FNn]".to_string(),
        'E' => "[FNn,*-3]".to_string(),
        'a' => "[PN]".to_string(),
        'Z' | 'X' | 'x' | 'z' => "[Z]".to_string(),
        other => {
            return Err(TranslateError::Metadata {
                message: format!("unsupported letter '{}' in display pattern '{}'", other, pattern),
            });
        }
    };
    Ok(picture)
}
