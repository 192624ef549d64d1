//! Placeholder substitution for fallback tooltips.
//!
//! | Placeholder | Value                                             |
//! |-------------|---------------------------------------------------|
//! | `$1`        | target title, after redirect follow, no fragment  |
//! | `$2`        | target fragment without `#`                       |
//! | `$3`        | direct target title, or `$1` without a redirect   |
//! | `$4`        | direct target fragment, or `$2` without a redirect |
//!
//! All four become empty when no target is known. Substitution is a single
//! pass, so a title containing `$1` is never expanded again.

use linktip_shared::LinkTitles;

fn split_fragment(title: &str) -> (&str, &str) {
    title.split_once('#').unwrap_or((title, ""))
}

/// Replaces `$1`..`$4` in `html`.
#[must_use]
pub fn substitute(html: &str, titles: &LinkTitles) -> String {
    let (target, target_fragment) = if titles.target.is_empty() {
        ("", "")
    } else {
        split_fragment(&titles.target)
    };
    let (direct, direct_fragment) = match titles.direct.as_deref() {
        Some(direct) if !titles.target.is_empty() => split_fragment(direct),
        _ => (target, target_fragment),
    };
    let values = [target, target_fragment, direct, direct_fragment];

    let mut out = String::with_capacity(html.len());
    let mut chars = html.chars().peekable();
    while let Some(c) = chars.next() {
        let slot = match (c, chars.peek()) {
            ('$', Some(&d @ '1'..='4')) => d as usize - '1' as usize,
            _ => {
                out.push(c);
                continue;
            }
        };
        chars.next();
        out.push_str(values[slot]);
    }
    out
}
