//! Entry admission rules for directory publishing.
//!
//! Every exclusion token is compared verbatim (backslashes read as `/`)
//! against the entry name. Tokens starting with `/` are also root-anchored
//! sub-paths matched against the slash-joined relative path of the entry:
//! `/a/b` excludes `a/b` and everything beneath it but not `a/bc`, and never
//! an entry merely named `b`. A token such as `a/b` without the leading slash
//! can equal no entry name and so excludes nothing.

/// Decide whether a directory entry takes part in synchronisation.
///
/// `relative_base` is the slash-separated path of the containing directory
/// relative to the synchronised root (empty for the root itself).
#[must_use]
pub fn is_valid_entry(
    relative_base: &str,
    entry_name: &str,
    is_file: bool,
    file_types: &[String],
    exclusions: &[String],
) -> bool {
    PathValidator::new(file_types, exclusions).allows(relative_base, entry_name, is_file)
}

/// Borrowed view of the suffix and exclusion rules for one synchronisation.
#[derive(Debug, Clone, Copy)]
pub struct PathValidator<'a> {
    file_types: &'a [String],
    exclusions: &'a [String],
}

impl<'a> PathValidator<'a> {
    /// Bundle suffix and exclusion rules.
    #[must_use]
    pub const fn new(file_types: &'a [String], exclusions: &'a [String]) -> Self {
        Self {
            file_types,
            exclusions,
        }
    }

    /// Apply exclusion then suffix rules to one entry.
    #[must_use]
    pub fn allows(&self, relative_base: &str, entry_name: &str, is_file: bool) -> bool {
        let relative = join_relative(relative_base, entry_name);
        if self
            .exclusions
            .iter()
            .any(|token| is_excluded(token, entry_name, &relative))
        {
            return false;
        }
        if !is_file || self.file_types.is_empty() {
            return true;
        }
        extension(entry_name)
            .is_some_and(|suffix| self.file_types.iter().any(|allowed| allowed == suffix))
    }
}

fn is_excluded(token: &str, entry_name: &str, relative: &str) -> bool {
    let token = token.replace('\\', "/");
    if token.is_empty() {
        return false;
    }
    if entry_name == token {
        return true;
    }
    let Some(anchored) = token.strip_prefix('/') else {
        return false;
    };
    let anchored = anchored.trim_end_matches('/');
    if anchored.is_empty() {
        return false;
    }
    relative == anchored
        || relative
            .strip_prefix(anchored)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn join_relative(base: &str, name: &str) -> String {
    let base = base.trim_matches('/');
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{base}/{name}")
    }
}

fn extension(name: &str) -> Option<&str> {
    name.rsplit_once('.')
        .map(|(_, suffix)| suffix)
        .filter(|suffix| !suffix.is_empty())
}
