//! Classification of user-supplied project locations

use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Where a project lives, before anything is fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectLocation {
    Local(PathBuf),
    Remote {
        clone_url: String,
        /// Path segments to descend into after cloning
        subdirs: Vec<String>,
    },
}

fn url_scheme_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://").expect("valid regex"))
}

// https://host/org/repo/tree/<branch>/<sub/dir>
fn tree_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<repo>[a-zA-Z][a-zA-Z0-9+.-]*://[^/]+/[^/]+/[^/]+)/tree/[^/]+(?:/(?P<rest>.*))?$")
            .expect("valid regex")
    })
}

impl ProjectLocation {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();

        if !Self::is_url(input) {
            return ProjectLocation::Local(PathBuf::from(input));
        }

        if let Some(caps) = tree_url_regex().captures(input) {
            let repo = caps.name("repo").map(|m| m.as_str()).unwrap_or(input);
            let subdirs = caps
                .name("rest")
                .map(|m| {
                    m.as_str()
                        .split('/')
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();

            return ProjectLocation::Remote {
                clone_url: with_git_suffix(repo),
                subdirs,
            };
        }

        ProjectLocation::Remote {
            clone_url: with_git_suffix(input),
            subdirs: Vec::new(),
        }
    }

    pub fn is_url(input: &str) -> bool {
        url_scheme_regex().is_match(input) || input.starts_with("git@")
    }
}

fn with_git_suffix(url: &str) -> String {
    let url = url.trim_end_matches('/');
    if url.to_ascii_lowercase().ends_with(".git") {
        url.to_string()
    } else {
        format!("{}.git", url)
    }
}

/// Folder name git would pick for a clone URL
pub fn repository_name(clone_url: &str) -> String {
    let last = clone_url
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .unwrap_or_default();
    let name = last.strip_suffix(".git").unwrap_or(last);

    if name.is_empty() {
        "repository".to_string()
    } else {
        name.to_string()
    }
}
