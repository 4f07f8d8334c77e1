// Public(crate) helpers reused by the assembler passes and the loader
pub(crate) fn strip_comment(l: &str) -> &str {
    let l = l.split(';').next().unwrap_or(l);
    let l = l.split('#').next().unwrap_or(l);
    l.split("//").next().unwrap_or(l)
}

pub(crate) fn preprocess(text: &str) -> Vec<(usize, String)> {
    text.lines()
        .enumerate()
        .map(|(i, l)| (i, strip_comment(l).trim().to_string()))
        .filter(|(_, l)| !l.is_empty())
        .collect()
}

/// Operands may be separated by commas, whitespace or both.
pub(crate) fn split_operands(rest: &str) -> Vec<String> {
    rest.split(|c: char| c == ',' || c.is_whitespace())
        .map(|t| t.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// `rN` / `RN` with any number of digits, whether or not N is in range.
pub(crate) fn looks_like_reg(s: &str) -> bool {
    let s = s.trim();
    s.len() > 1
        && (s.starts_with('r') || s.starts_with('R'))
        && s[1..].chars().all(|c| c.is_ascii_digit())
}

pub(crate) fn parse_reg(s: &str) -> Option<u8> {
    if !looks_like_reg(s) {
        return None;
    }
    let num = s.trim()[1..].parse::<u32>().ok()?;
    if num < 16 { Some(num as u8) } else { None }
}

pub(crate) fn parse_imm(s: &str) -> Option<i64> {
    let s = s.trim();
    let (neg, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (digits, radix) = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        (hex, 16)
    } else if let Some(bin) = body.strip_prefix("0b").or_else(|| body.strip_prefix("0B")) {
        (bin, 2)
    } else {
        (body, 10)
    };
    // from_str_radix would take a second sign after the prefix
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let v = i64::from_str_radix(digits, radix).ok()?;
    Some(if neg { -v } else { v })
}

pub(crate) fn is_symbol_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn check_range(v: i64, min: i64, max: i64, ctx: &str) -> Result<i64, String> {
    if v < min || v > max {
        Err(format!("{ctx}: value {v} out of range ({min}..{max})"))
    } else {
        Ok(v)
    }
}
