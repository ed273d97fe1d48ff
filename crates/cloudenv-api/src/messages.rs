//! Human-friendly hints for known control-plane errors

const HINTS: &[(&str, &str)] = &[
    (
        "already exists",
        "An environment with this name already exists. Pick another name or import the existing one",
    ),
    (
        "invalid credentials",
        "The API token was rejected. Check CLOUDENV_API_TOKEN or api_token in cloudenv.yaml",
    ),
    (
        "unauthorized",
        "The API token was rejected. Check CLOUDENV_API_TOKEN or api_token in cloudenv.yaml",
    ),
    (
        "permission denied",
        "The API token lacks permission for this operation",
    ),
    (
        "quota",
        "A cloud quota was exceeded. Request a quota increase or reduce node group capacity",
    ),
    (
        "mfa",
        "This operation requires MFA approval. Approve it and run the operation again",
    ),
];

/// Append an actionable hint to `raw` when it matches a known error.
///
/// Unknown messages are returned unchanged.
pub fn friendly_message(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    match HINTS.iter().find(|(needle, _)| lowered.contains(needle)) {
        Some((_, hint)) => format!("{}\nHint: {}", raw, hint),
        None => raw.to_string(),
    }
}
