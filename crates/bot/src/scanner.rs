//! Feed scanning loop.
//!
//! Each cycle pulls the newest submissions and narrows them down to
//! video links by authors worth checking; the promotion classifier then
//! runs over each author's recent history. Verdicts and the set of
//! already evaluated submissions are persisted after every submission,
//! and the reported flag is written out before the report itself goes
//! to the feed, so a crash can drop a report but never duplicate one.

use std::time::{Duration, Instant};

use chrono::Utc;

use clipwatch_client::feed::{FeedApi, FeedError, Submission};
use clipwatch_core::classify::{
    self, AuthoredComment, HISTORY_LIMIT, HISTORY_WINDOW_DAYS, SubmittedLink, UserHistory, Verdict,
    VideoLookup,
};
use clipwatch_core::{AppConfig, ScanState, StateStore};

/// Polls the feed and evaluates submitters of video links.
pub struct Scanner<F, V> {
    feed: F,
    video: V,
    store: StateStore,
    config: AppConfig,
    cursor: Option<String>,
}

impl<F: FeedApi, V: VideoLookup> Scanner<F, V> {
    pub fn new(feed: F, video: V, store: StateStore, config: AppConfig) -> Self {
        Self { feed, video, store, config, cursor: None }
    }

    /// Run scan cycles until the process is terminated.
    pub async fn run(&mut self) {
        loop {
            let started = Instant::now();
            if let Err(err) = self.scan_cycle().await {
                tracing::warn!(error = %err, "scan cycle failed");
            }

            let sleep = cycle_sleep(started.elapsed(), self.config.poll_interval());
            tracing::debug!(secs = sleep.as_secs(), "sleeping until next cycle");
            tokio::time::sleep(sleep).await;
        }
    }

    async fn scan_cycle(&mut self) -> Result<(), FeedError> {
        let submissions = self.feed.fetch_new(self.cursor.as_deref()).await?;
        if let Some(newest) = submissions.last() {
            self.cursor = Some(newest.id.clone());
        }

        let mut examined = 0usize;
        for submission in &submissions {
            let Some(author) = submission.author.as_deref() else {
                continue;
            };
            if self.config.is_ignored_forum(&submission.forum)
                || self.config.is_ignored_user(author)
                || !self.config.is_video_domain(&submission.domain)
            {
                continue;
            }

            examined += 1;
            self.process(author, submission).await;
        }

        tracing::info!(fetched = submissions.len(), examined, "scan cycle complete");
        Ok(())
    }

    /// Evaluate one submission. Every exit path marks the submission
    /// evaluated, so it is never picked up again.
    async fn process(&self, author: &str, submission: &Submission) {
        let mut state = self.store.load();
        if state.has_evaluated(&submission.id) {
            return;
        }

        if state.already_reported(author) {
            tracing::debug!(author, id = %submission.id, "author already reported");
            state.mark_evaluated(&submission.id);
            self.save(&state);
            return;
        }

        let history = match self.fetch_history(author).await {
            Ok(history) => history,
            Err(err) => {
                tracing::warn!(author, error = %err, "history fetch failed, skipping submission");
                state.mark_evaluated(&submission.id);
                self.save(&state);
                return;
            }
        };

        let verdict = classify::evaluate(&self.video, &submission.url, &history).await;

        let mut record = state.get_user(author);
        record.checked_last = Utc::now().timestamp();
        if verdict.is_promoter() {
            record.reported = true;
        }
        state.put_user(author, record);
        state.mark_evaluated(&submission.id);

        // The latch goes to disk before the report goes out; a crash in
        // between drops the report rather than filing it twice.
        self.save(&state);

        match verdict {
            Verdict::Promoter(evidence) => {
                tracing::info!(
                    author,
                    channel = %evidence.channel,
                    video_links = evidence.video_links,
                    video_fraction = evidence.video_fraction,
                    activity_ratio = evidence.activity_ratio,
                    comments_on_own = evidence.comments_on_own,
                    "promoter detected"
                );
                self.report(author).await;
            }
            Verdict::Clean => {
                tracing::debug!(author, id = %submission.id, "history looks clean");
            }
        }
    }

    async fn fetch_history(&self, author: &str) -> Result<UserHistory, FeedError> {
        let since = Utc::now() - chrono::Duration::days(HISTORY_WINDOW_DAYS);

        let submissions = self.feed.fetch_user_submissions(author, HISTORY_LIMIT, since).await?;
        let comments = self.feed.fetch_user_comments(author, HISTORY_LIMIT, since).await?;

        Ok(UserHistory {
            submissions: submissions
                .into_iter()
                .map(|s| SubmittedLink { id: s.id, url: s.url })
                .collect(),
            comments: comments
                .into_iter()
                .map(|c| AuthoredComment { submission_id: c.submission_id })
                .collect(),
        })
    }

    async fn report(&self, author: &str) {
        let title = format!("{author} [video spam]");
        let url = self.feed.user_page_url(author);

        if let Err(err) = self.feed.submit_report(&self.config.report_forum, &title, &url).await {
            tracing::warn!(author, error = %err, "report submission failed");
        }
    }

    fn save(&self, state: &ScanState) {
        if let Err(err) = self.store.save(state) {
            tracing::warn!(error = %err, "state save failed");
        }
    }
}

/// Backlog handling: a cycle that consumed the whole interval is followed
/// by a short pause instead of the full one.
fn cycle_sleep(elapsed: Duration, interval: Duration) -> Duration {
    if elapsed >= interval { Duration::from_secs(1) } else { interval }
}
