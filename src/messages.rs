//! Message bundle
//!
//! Messages are looked up by key; `{0}`, `{1}`, ... are replaced by the
//! arguments. An unknown key formats to the key itself.

use std::fmt::Display;

const BUNDLE: &[(&str, &str)] = &[
    (
        "patch.updateGuestPermission.description",
        "Rename permission 'Guest' to 'Consumer'.",
    ),
    (
        "patch.updateGuestPermission.result",
        "Renamed permission 'Guest' to 'Consumer' on {0} access control entries.",
    ),
    (
        "template.none",
        "No template is available to render the requested asset.",
    ),
];

pub fn lookup(key: &str) -> Option<&'static str> {
    BUNDLE.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Formats the message `key` with `args`.
pub fn message(key: &str, args: &[&dyn Display]) -> String {
    let Some(template) = lookup(key) else {
        return key.to_string();
    };

    format_template(template, args)
}

/// Replaces `{n}` placeholders in one pass; arguments are never rescanned.
/// Placeholders without a matching argument are kept as written.
fn format_template(template: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let arg = tail.find('}').and_then(|end| {
            let arg = tail[1..end].parse::<usize>().ok().and_then(|i| args.get(i))?;
            Some((arg, end))
        });
        match arg {
            Some((arg, end)) => {
                out.push_str(&arg.to_string());
                rest = &tail[end + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);

    out
}
