//! The VCS status column.
//!
//! Draws two icons per row (staged slot, then unstaged slot) followed by a
//! space, or three spaces for clean paths. After a buffer write it redraws
//! only the rows whose status changed.

use std::sync::Arc;

use async_trait::async_trait;
use canopy_core::{GitIcons, Node};
use canopy_notify::{Debouncer, StatusChangeNotifier, broadcast_stream};
use canopy_vcs::GitTracker;
use futures_util::StreamExt;
use tracing::{debug, info, warn};

use crate::column::{Column, ColumnContext, ColumnDeps};
use crate::indexes::IndexScope;
use crate::row::Row;

/// Highlight of the staged slot.
pub const STAGE_HIGHLIGHT: &str = "FileGitStage";

/// Highlight of the unstaged slot.
pub const UNSTAGE_HIGHLIGHT: &str = "FileGitUnstage";

const BLANK: &str = "   ";

/// Shows git status and keeps it current on buffer writes.
#[derive(Debug)]
pub struct GitColumn {
    tracker: Arc<GitTracker>,
    notifier: Arc<StatusChangeNotifier>,
    debouncer: Debouncer,
    icons: GitIcons,
}

impl GitColumn {
    /// Creates the column from shared services.
    #[must_use]
    pub fn new(deps: &ColumnDeps) -> Self {
        Self {
            tracker: Arc::clone(&deps.tracker),
            notifier: Arc::new(StatusChangeNotifier::new(
                Arc::clone(&deps.tracker),
                Arc::clone(&deps.lookup),
            )),
            debouncer: Debouncer::from_config(&deps.config.notify),
            icons: deps.config.git.icons.clone(),
        }
    }

    /// The notifier holding this column's previous-status baseline.
    #[must_use]
    pub fn notifier(&self) -> &Arc<StatusChangeNotifier> {
        &self.notifier
    }
}

#[async_trait]
impl Column for GitColumn {
    fn name(&self) -> &'static str {
        "git"
    }

    async fn validate(&self) -> bool {
        let available = self.tracker.probe_available().await;
        if !available {
            info!(program = self.tracker.program(), "git not available, status column disabled");
        }
        available
    }

    fn init(&self, ctx: &ColumnContext<'_>) {
        let events = broadcast_stream(ctx.subscribe())
            .filter_map(|event| futures_util::future::ready(event.written_buffer()));
        let notifier = Arc::clone(&self.notifier);
        let render = ctx.render_handle();
        let cancel = ctx.cancellation();
        let debouncer = self.debouncer;

        ctx.spawn(async move {
            let runs = debouncer
                .run(events, cancel, move |buffer| {
                    let notifier = Arc::clone(&notifier);
                    let render = render.clone();
                    async move {
                        let result = notifier
                            .process_write(buffer, |changed| {
                                render.request(changed.clone());
                            })
                            .await;
                        if let Err(err) = result {
                            warn!(%buffer, error = %err, "Status refresh failed");
                        }
                    }
                })
                .await;
            debug!(runs, "Git column task finished");
        });
    }

    async fn reload(&self, node: &Node) {
        let directory = node.containing_dir();
        if let Err(err) = self.tracker.reload(directory).await {
            warn!(path = %directory, error = %err, "Status reload failed");
            return;
        }
        self.notifier.set_baseline(self.tracker.get_statuses(directory));
    }

    fn draw(&self, row: &mut Row, node: &Node, index: usize, indexes: &IndexScope<'_>) {
        match self.tracker.get_status(&node.path) {
            Some(status) => {
                row.add_highlighted(self.icons.icon(status.index), STAGE_HIGHLIGHT);
                row.add_highlighted(self.icons.icon(status.worktree), UNSTAGE_HIGHLIGHT);
                row.add(" ");
                indexes.add(index);
            }
            None => {
                row.add(BLANK);
                indexes.remove(index);
            }
        }
    }

    fn draw_unavailable(&self, row: &mut Row) {
        row.add(BLANK);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::fixtures::{draw, entry};
    use crate::indexes::ColumnIndexes;
    use camino::Utf8PathBuf;
    use canopy_core::{Config, GitConfig, StatusCode, StatusPair};
    use canopy_notify::{BufferLookup, BufferTable};
    use canopy_vcs::StatusSnapshot;

    fn column(command: &str) -> GitColumn {
        let mut config = Config::default();
        config.git = GitConfig {
            command: command.to_owned(),
            ..GitConfig::default()
        };
        let deps = ColumnDeps {
            root: "/r".into(),
            tracker: Arc::new(GitTracker::new(&config.git)),
            config: Arc::new(config),
            lookup: Arc::new(BufferTable::new()) as Arc<dyn BufferLookup>,
        };
        GitColumn::new(&deps)
    }

    #[test]
    fn test_draw_status_and_blank() {
        let column = column("git");
        column.tracker.install(StatusSnapshot::from_entries(
            "/r".into(),
            vec![(
                Utf8PathBuf::from("/r/src/lib.rs"),
                StatusPair::new(StatusCode::Modified, StatusCode::Unmodified),
            )],
        ));
        let indexes = ColumnIndexes::new();

        insta::assert_snapshot!(draw(&column, &entry("/r/src/lib.rs", false), 2, &indexes), @"M  ");
        insta::assert_snapshot!(draw(&column, &entry("/r/src", true), 1, &indexes), @"M  ");
        assert_eq!(draw(&column, &entry("/r/README.md", false), 3, &indexes), "   ");
        assert_eq!(indexes.get("git"), [1, 2]);
    }

    #[test]
    fn test_draw_highlights_slots() {
        let column = column("git");
        column.tracker.install(StatusSnapshot::from_entries(
            "/r".into(),
            vec![(
                Utf8PathBuf::from("/r/new.rs"),
                StatusPair::new(StatusCode::Untracked, StatusCode::Untracked),
            )],
        ));
        let indexes = ColumnIndexes::new();
        let mut row = Row::new();
        column.draw(&mut row, &entry("/r/new.rs", false), 0, &indexes.scope("git"));

        let segments: Vec<_> = row
            .segments()
            .iter()
            .map(|s| (s.text.as_str(), s.highlight))
            .collect();
        assert_eq!(
            segments,
            [
                ("?", Some(STAGE_HIGHLIGHT)),
                ("?", Some(UNSTAGE_HIGHLIGHT)),
                (" ", None)
            ]
        );
    }

    #[test]
    fn test_status_clears_mark() {
        let column = column("git");
        let indexes = ColumnIndexes::new();
        indexes.scope("git").add(5);

        assert_eq!(draw(&column, &entry("/r/clean.rs", false), 5, &indexes), "   ");
        assert!(indexes.get("git").is_empty());
    }

    #[test]
    fn test_unavailable_draws_blank() {
        let mut row = Row::new();
        column("git").draw_unavailable(&mut row);
        assert_eq!(row.text(), "   ");
    }

    #[tokio::test]
    async fn test_missing_git_fails_validation() {
        let column = column("canopy-no-such-git-binary");
        assert!(!column.validate().await);
    }

    #[tokio::test]
    async fn test_reload_outside_repository_keeps_baseline() {
        let column = column("canopy-no-such-git-binary");
        column.reload(&entry("/r/src", true)).await;
        assert!(column.notifier().baseline().is_empty());
    }
}
