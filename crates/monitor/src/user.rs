use nix::unistd::{Uid, User};

/// Placeholder used when no acting user can be determined.
pub const UNKNOWN_USER: &str = "unknown_user";

/// Name written on every audit line.
///
/// Looks at `LOGNAME`, then `USER`, then the password database entry of the
/// real uid, and finally falls back to [`UNKNOWN_USER`].
pub fn resolve_username() -> String {
    resolve_with(|key| std::env::var(key).ok(), lookup_uid)
}

fn lookup_uid() -> Option<String> {
    User::from_uid(Uid::current())
        .ok()
        .flatten()
        .map(|user| user.name)
}

fn resolve_with(
    env: impl Fn(&str) -> Option<String>,
    passwd: impl FnOnce() -> Option<String>,
) -> String {
    ["LOGNAME", "USER"]
        .into_iter()
        .filter_map(|key| env(key))
        .chain(std::iter::once_with(passwd).flatten())
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_USER.to_string())
}
