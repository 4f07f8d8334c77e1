use crate::batpu::asm::utils::strip_comment;
use crate::batpu::asm::{AsmError, Diagnostics, Program};
use crate::batpu::isa::{MAX_PROGRAM_WORDS, WORD_BITS};

/// Parses a machine code image: one word per line as 16 binary digits.
/// Spaces or underscores between digit groups are allowed.
pub fn parse_machine_code(text: &str) -> Result<Program, Diagnostics> {
    let mut words = Vec::new();
    let mut lines = Vec::new();
    let mut errors = Vec::new();

    for (line, raw) in text.lines().enumerate() {
        let digits: String = strip_comment(raw)
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect();
        if digits.is_empty() {
            continue;
        }
        if digits.len() != WORD_BITS || !digits.chars().all(|c| c == '0' || c == '1') {
            errors.push(AsmError {
                line,
                msg: format!("expected {WORD_BITS} binary digits, got {digits:?}"),
            });
            continue;
        }
        match u16::from_str_radix(&digits, 2) {
            Ok(w) => {
                words.push(w);
                lines.push(line);
            }
            Err(e) => errors.push(AsmError { line, msg: e.to_string() }),
        }
    }

    if words.len() > MAX_PROGRAM_WORDS {
        errors.push(AsmError {
            line: lines[MAX_PROGRAM_WORDS],
            msg: format!("image has {} words, limit is {MAX_PROGRAM_WORDS}", words.len()),
        });
    }
    if !errors.is_empty() {
        errors.sort_by_key(|e| e.line);
        return Err(Diagnostics(errors));
    }
    Ok(Program { text: words, lines })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_plain_and_grouped_words() {
        let prog = parse_machine_code("0010000100100011\n\n0001 0000 0000 0000\n").unwrap();
        assert_eq!(prog.text, vec![0x2123, 0x1000]);
        assert_eq!(prog.lines, vec![0, 2]);
    }

    #[test]
    fn rejects_short_or_non_binary_lines() {
        let diags = parse_machine_code("0101\n00100001001000x1").unwrap_err();
        assert_eq!(diags.len(), 2);
        assert_eq!(diags.first().map(|e| e.line), Some(0));
    }
}
