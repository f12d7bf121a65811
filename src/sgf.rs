//! Post-processing of engine-produced position records.
//!
//! These are deliberately plain substring edits on the record text, not an
//! SGF parser: the engine wrote the file, so its field shapes are known.

/// Replace the `PW[Human]` placeholder with a synthesized player name
/// carrying the first 8 characters of the weight-file identifier. When the
/// record already embeds a label in its `PB[...]` field (engine name and
/// version, ending in a space), that label is carried over; otherwise the
/// engine's display name is used.
pub fn embed_player_name(data: &str, engine_name: &str, weight_file: &str) -> String {
    let label = existing_player_label(data)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{engine_name} "));
    let weight_id = &weight_file[..weight_file.len().min(8)];
    data.replacen("PW[Human]", &format!("PW[{label}{weight_id}]"), 1)
}

/// Label inside the `PB[...]` field up to and including the space before
/// its last token (the weight identifier), e.g. `"Leela Zero 0.17 "`.
fn existing_player_label(data: &str) -> Option<&str> {
    let start = data.find("PB[")? + 3;
    let end = start + data[start..].find(']')?;
    let content = &data[start..end];
    let last_space = content.rfind(' ')?;
    Some(&content[..last_space + 1])
}

/// Rewrite the declared result of a resignation game to the
/// black-resignation convention, falling back to the white-result field
/// when no black-result field matches, and strip a trailing pass at the
/// reserved "tt" coordinate immediately before the closing marker: a
/// resignation record must not end with a dangling pass.
pub fn rewrite_resignation(data: &str) -> String {
    const NEW_RESULT: &str = "RE[B+Resign] ";
    let mut data = match replace_field(data, "RE[B+", NEW_RESULT) {
        Some(replaced) => replaced,
        None => replace_field(data, "RE[W+", NEW_RESULT).unwrap_or_else(|| data.to_string()),
    };
    if let Some(pos) = data.find(";W[tt])") {
        data.replace_range(pos..pos + ";W[tt])".len(), ")");
    }
    data
}

/// Rewrite the declared result to the estimated margin, or to an explicit
/// `RE[0]` marker when the estimate mean was exactly zero.
pub fn rewrite_estimated_result(data: &str, mean: f32) -> String {
    let new_result = if mean == 0.0 {
        "RE[0] ".to_string()
    } else {
        format!(
            "RE[{}{:.3}] ",
            if mean > 0.0 { "B+" } else { "W+" },
            mean.abs()
        )
    };
    replace_field(data, "RE[", &new_result).unwrap_or_else(|| data.to_string())
}

/// Replace the field starting with `prefix` through its closing `]` with
/// `replacement`. Returns `None` when no such field exists.
fn replace_field(data: &str, prefix: &str, replacement: &str) -> Option<String> {
    let start = data.find(prefix)?;
    let end = start + data[start..].find(']')? + 1;
    let mut out = String::with_capacity(data.len() + replacement.len());
    out.push_str(&data[..start]);
    out.push_str(replacement);
    out.push_str(&data[end..]);
    Some(out)
}
