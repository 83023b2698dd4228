//! Identifier normalization
//!
//! Turns arbitrary human-authored schema names into canonical symbol
//! fragments that are safe to use in generated code: CamelCase boundaries
//! become underscores, anything outside `[A-Za-z0-9_]` becomes an
//! underscore, and the result is folded to a single case convention
//! (lowercase fragments for namespace-qualified symbols, UPPERCASE for
//! record field names).
//!
//! Runs of underscores are collapsed as the last step, so normalizing an
//! already-canonical name returns it unchanged. Two raw names that differ
//! only by separator style (`EngineSpeed` vs `engine_speed`) normalize to
//! the same canonical name; the compiler treats that as a fatal collision
//! when both occur in the same scope.

/// Normalize a schema name to a canonical lowercase symbol fragment.
pub fn canonical(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            // Word boundary: lower/digit followed by upper, or an upper
            // that starts a new capitalized word (next char is lower).
            let prev = chars[i - 1];
            let next_is_lower = chars
                .get(i + 1)
                .map_or(false, |n| n.is_ascii_lowercase());
            if prev.is_ascii_lowercase() || prev.is_ascii_digit() || next_is_lower {
                out.push('_');
            }
        }
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else {
            out.push('_');
        }
    }

    collapse_underscores(&out)
}

/// Normalize a schema name to an UPPERCASE record field name.
pub fn field_name(name: &str) -> String {
    canonical(name).to_ascii_uppercase()
}

fn collapse_underscores(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_underscore = false;
    for c in s.chars() {
        if c == '_' {
            if !prev_underscore {
                out.push(c);
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }
    out
}
