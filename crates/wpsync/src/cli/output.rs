//! Rendering of command results, as text for people or JSON for scripts.

use serde::Serialize;
use wpsync_core::cache::{ArtifactPaths, CachedSnapshot};
use wpsync_core::config::Config;
use wpsync_core::post::{Post, PostId};
use wpsync_core::sync::{LocalStatus, SyncReport};

use super::CliError;

pub struct Output {
    json: bool,
}

#[derive(Serialize)]
struct CachedPostRow<'a> {
    id: PostId,
    status: Option<&'a str>,
    title: Option<&'a str>,
}

#[derive(Serialize)]
struct CachedPostDetail<'a> {
    id: PostId,
    title: Option<&'a str>,
    content_hash: &'a str,
    editable_meta_hash: &'a str,
    files: &'a ArtifactPaths,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    fn print_json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("✗ Could not serialize output: {}", e),
        }
    }

    pub fn sync_report(&self, report: &SyncReport) {
        if self.json {
            self.print_json(report);
            return;
        }

        if report.cancelled {
            println!("Sync cancelled; partial results:");
        } else if report.is_empty() {
            println!("✓ Everything up to date");
            return;
        } else {
            println!("✓ Sync complete ({} posts)", report.total());
        }

        let sections = [
            ("Pushed to server", &report.pushed_to_server),
            ("Pulled from server", &report.pulled_from_server),
            ("Deleted locally", &report.deleted_from_local),
            ("Newly cached", &report.newly_cached),
            ("Conflicts", &report.conflicted),
        ];
        for (label, ids) in sections {
            if !ids.is_empty() {
                println!("  {}: {}", label, join_ids(ids));
            }
        }
        if !report.conflicted.is_empty() {
            println!();
            println!("Conflicting posts changed on both sides and were left untouched.");
        }
    }

    pub fn local_status(&self, statuses: &[LocalStatus]) {
        if self.json {
            self.print_json(&statuses);
            return;
        }

        let modified: Vec<&LocalStatus> = statuses.iter().filter(|s| s.is_modified()).collect();
        if modified.is_empty() {
            println!("No local changes ({} cached posts)", statuses.len());
            return;
        }

        println!("Local changes:");
        for status in modified {
            let what = match (status.content_changed, status.metadata_changed) {
                (true, true) => "content, metadata",
                (true, false) => "content",
                _ => "metadata",
            };
            println!(
                "  {:>6}  {}  ({})",
                status.id,
                status.title.as_deref().unwrap_or("(untitled)"),
                what
            );
        }
    }

    pub fn cached_posts(&self, snapshots: &[CachedSnapshot]) {
        let rows: Vec<CachedPostRow> = snapshots
            .iter()
            .map(|s| CachedPostRow {
                id: s.id(),
                status: s.post.status.as_deref(),
                title: s.post.raw_title(),
            })
            .collect();

        if self.json {
            self.print_json(&rows);
            return;
        }

        if rows.is_empty() {
            println!("Cache is empty. Run 'wpsync sync' first.");
            return;
        }
        for row in rows {
            println!(
                "{:>6}  {:<8}  {}",
                row.id,
                row.status.unwrap_or("-"),
                row.title.unwrap_or("(untitled)")
            );
        }
    }

    pub fn cached_post(&self, snapshot: &CachedSnapshot, paths: &ArtifactPaths) {
        let detail = CachedPostDetail {
            id: snapshot.id(),
            title: snapshot.post.raw_title(),
            content_hash: &snapshot.content_hash,
            editable_meta_hash: &snapshot.editable_meta_hash,
            files: paths,
        };

        if self.json {
            self.print_json(&detail);
            return;
        }

        println!("Post {}: {}", detail.id, detail.title.unwrap_or("(untitled)"));
        println!("  Content hash:  {}", detail.content_hash);
        println!("  Metadata hash: {}", detail.editable_meta_hash);
        for (label, path) in [
            ("Content", &paths.content),
            ("Metadata", &paths.editable),
            ("Snapshot", &paths.snapshot),
        ] {
            match path {
                Some(path) => println!("  {:<9} {}", format!("{label}:"), path.display()),
                None => println!("  {:<9} (missing)", format!("{label}:")),
            }
        }
    }

    pub fn posts(&self, posts: &[Post]) {
        if self.json {
            self.print_json(&posts);
            return;
        }

        if posts.is_empty() {
            println!("No posts found.");
            return;
        }
        for post in posts {
            println!(
                "{:>6}  {:<8}  {}",
                post.id,
                post.status.as_deref().unwrap_or("-"),
                display_title(post)
            );
        }
    }

    pub fn post(&self, post: &Post) {
        if self.json {
            self.print_json(post);
            return;
        }

        println!("Post {}: {}", post.id, display_title(post));
        println!("  Status:   {}", post.status.as_deref().unwrap_or("-"));
        println!("  Slug:     {}", post.slug.as_deref().unwrap_or("-"));
        if let Some(date) = post.date {
            println!("  Date:     {}", date);
        }
        if let Some(link) = &post.link {
            println!("  Link:     {}", link);
        }
        println!();
        println!("{}", post.body());
    }

    pub fn deleted_post(&self, post: &Post, permanently: bool) {
        if self.json {
            self.print_json(&serde_json::json!({
                "deleted": permanently,
                "previous": post,
            }));
            return;
        }

        if permanently {
            println!("✓ Deleted post {}: {}", post.id, display_title(post));
        } else {
            println!("✓ Moved post {} to the trash: {}", post.id, display_title(post));
        }
    }

    pub fn config(&self, config: &Config) {
        let mut shown = config.clone();
        shown.bearer_token = shown.bearer_token.map(|_| "********".to_string());

        if self.json {
            self.print_json(&shown);
            return;
        }

        println!("wpsync Configuration");
        println!("====================");
        println!("Base URL: {}", shown.base_url);
        println!("Cache directory: {}", shown.cache_dir.display());
        println!("Sync limit: {}", shown.sync_limit);
        println!("Sync statuses: {}", shown.sync_statuses.join(", "));
        if let Some(token) = &shown.bearer_token {
            println!("Bearer token: {}", token);
        }
        if let Some(config_path) = Config::config_path() {
            println!("Config file: {}", config_path.display());
        }
    }

    pub fn message(&self, text: &str) {
        if !self.json {
            println!("✓ {}", text);
        }
    }

    pub fn error(&self, err: &CliError) {
        if self.json {
            let value = match err {
                CliError::Core(e) => serde_json::to_value(e.to_serializable()),
                other => serde_json::to_value(serde_json::json!({
                    "kind": "Cli",
                    "message": other.to_string(),
                })),
            };
            match value {
                Ok(value) => self.print_json(&serde_json::json!({ "error": value })),
                Err(_) => eprintln!("✗ {}", err),
            }
        } else {
            eprintln!("✗ {}", err);
        }
    }
}

/// Title as the site shows it.
fn display_title(post: &Post) -> String {
    match &post.title {
        Some(title) if !title.to_string().is_empty() => title.to_string(),
        _ => "(untitled)".to_string(),
    }
}

fn join_ids(ids: &[PostId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
