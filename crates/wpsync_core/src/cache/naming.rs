//! File naming for cached posts.
//!
//! Every artifact of post `id` is named `{id}-{title}{suffix}`. The `-` after
//! the id is what keeps post 4's glob from matching post 42's files.

use glob::Pattern;

use crate::post::{Post, PostId};

/// Subdirectory of the cache root holding post artifacts.
pub const POSTS_DIR: &str = "posts";

/// Suffix of the editable metadata artifact.
pub const EDITABLE_SUFFIX: &str = "_editable.yaml";

/// Suffix of the raw body artifact.
pub const CONTENT_SUFFIX: &str = "_content.md";

/// Suffix of the snapshot artifact.
pub const SNAPSHOT_SUFFIX: &str = "_meta.json";

/// Suffix of an in-flight write.
pub const TEMP_SUFFIX: &str = ".tmp";

const MAX_TITLE_LEN: usize = 100;

/// The three artifact kinds of a cached post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    /// `_editable.yaml`
    Editable,
    /// `_content.md`
    Content,
    /// `_meta.json`
    Snapshot,
}

impl Artifact {
    /// File name suffix for this artifact.
    pub fn suffix(self) -> &'static str {
        match self {
            Artifact::Editable => EDITABLE_SUFFIX,
            Artifact::Content => CONTENT_SUFFIX,
            Artifact::Snapshot => SNAPSHOT_SUFFIX,
        }
    }
}

fn is_invalid_file_name_char(ch: char) -> bool {
    matches!(ch, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') || ch.is_control()
}

/// Turn a title into something safe to embed in a file name.
///
/// Invalid characters become `-`, runs of `-` collapse to one, and the result
/// is capped at 100 characters. Blank titles become `untitled`.
pub fn sanitize_title(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|ch| if is_invalid_file_name_char(ch) { '-' } else { ch })
        .collect();

    let mut collapsed = String::with_capacity(replaced.len());
    for ch in replaced.trim().chars() {
        if ch == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(ch);
    }

    let truncated: String = collapsed.chars().take(MAX_TITLE_LEN).collect();
    let truncated = truncated.trim();
    if truncated.is_empty() {
        "untitled".to_string()
    } else {
        truncated.to_string()
    }
}

/// `{id}-{sanitized title}` for a post, falling back to the slug when untitled.
pub fn base_name(post: &Post) -> String {
    let title = post
        .raw_title()
        .filter(|t| !t.trim().is_empty())
        .or(post.slug.as_deref())
        .unwrap_or_default();
    format!("{}-{}", post.id, sanitize_title(title))
}

/// File name of one artifact.
pub fn file_name(base: &str, artifact: Artifact) -> String {
    format!("{base}{}", artifact.suffix())
}

/// Hidden temporary name used while writing `name`.
pub fn temp_name(name: &str) -> String {
    format!(".{name}{TEMP_SUFFIX}")
}

/// Pattern matching every artifact of post `id`.
pub fn id_pattern(id: PostId) -> Pattern {
    // Digits and '-' carry no glob meaning, so this cannot fail
    Pattern::new(&format!("{id}-*")).unwrap_or_default()
}

/// Pattern matching one artifact kind of post `id`.
pub fn artifact_pattern(id: PostId, artifact: Artifact) -> Pattern {
    Pattern::new(&format!("{id}-*{}", artifact.suffix())).unwrap_or_default()
}

/// Pattern matching leftover temporaries of post `id`.
pub fn temp_pattern(id: PostId) -> Pattern {
    Pattern::new(&format!(".{id}-*{TEMP_SUFFIX}")).unwrap_or_default()
}

/// Post id of a temporary file name, e.g. `5` for `.5-Title_content.md.tmp`.
pub fn temp_id(name: &str) -> Option<PostId> {
    let (id, _) = name
        .strip_prefix('.')?
        .strip_suffix(TEMP_SUFFIX)?
        .split_once('-')?;
    id.parse().ok()
}

/// Whether `name` is the temporary of a snapshot.
pub fn is_temp_snapshot(name: &str) -> bool {
    name.strip_suffix(TEMP_SUFFIX)
        .is_some_and(|n| n.starts_with('.') && n.ends_with(SNAPSHOT_SUFFIX))
}
