use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;

use super::*;
use crate::application::ports::BindError;

type Reply = Result<String, FetchError>;

/// Content source replaying scripted replies per fragment. The last reply
/// of each script repeats forever. Unscripted fragments are not found.
#[derive(Default)]
struct ScriptedSource {
    scripts: Mutex<HashMap<FragmentId, VecDeque<Reply>>>,
    calls: Arc<Mutex<HashMap<FragmentId, usize>>>,
}

impl ScriptedSource {
    fn reply(self, fragment: &str, replies: impl IntoIterator<Item = Reply>) -> Self {
        self.scripts
            .lock()
            .expect("scripts lock")
            .insert(FragmentId::from(fragment), replies.into_iter().collect());
        self
    }

    fn call_log(&self) -> Arc<Mutex<HashMap<FragmentId, usize>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ContentSource for ScriptedSource {
    async fn fetch(&self, fragment: &FragmentId) -> Result<String, FetchError> {
        *self
            .calls
            .lock()
            .expect("calls lock")
            .entry(fragment.clone())
            .or_default() += 1;

        let mut scripts = self.scripts.lock().expect("scripts lock");
        let Some(script) = scripts.get_mut(fragment) else {
            return Err(FetchError::NotFound);
        };
        if script.len() > 1 {
            script.pop_front().unwrap_or(Err(FetchError::NotFound))
        } else {
            script.front().cloned().unwrap_or(Err(FetchError::NotFound))
        }
    }
}

#[derive(Default)]
struct RecordingBinder {
    bound: Vec<(FragmentId, TargetId, BoundContent)>,
    missing: Vec<TargetId>,
    broken: Vec<TargetId>,
}

impl RecordingBinder {
    fn without(target: &str) -> Self {
        Self {
            missing: vec![TargetId::new(target)],
            ..Self::default()
        }
    }

    fn failing_rewrite(target: &str) -> Self {
        Self {
            broken: vec![TargetId::new(target)],
            ..Self::default()
        }
    }
}

impl TargetBinder for RecordingBinder {
    fn bind(
        &mut self,
        fragment: &FragmentId,
        target: &TargetId,
        content: BoundContent,
    ) -> Result<(), BindError> {
        if self.missing.contains(target) {
            return Err(BindError::MissingTarget {
                target: target.clone(),
            });
        }
        if self.broken.contains(target) {
            return Err(BindError::Rewrite {
                message: "parser stalled".to_string(),
            });
        }
        self.bound.push((fragment.clone(), target.clone(), content));
        Ok(())
    }
}

fn catalog(pairs: &[(&str, &str)]) -> FragmentCatalog {
    FragmentCatalog::from_pairs(pairs.iter().copied()).expect("valid catalog")
}

fn calls(log: &Arc<Mutex<HashMap<FragmentId, usize>>>, fragment: &str) -> usize {
    log.lock()
        .expect("calls lock")
        .get(&FragmentId::from(fragment))
        .copied()
        .unwrap_or(0)
}

fn event_names(outcome: &PollOutcome) -> Vec<&'static str> {
    outcome.events.iter().map(LoadEvent::name).collect()
}

fn text(body: &str) -> Reply {
    Ok(body.to_string())
}

#[tokio::test(start_paused = true)]
async fn all_not_found_stops_after_one_pass() {
    let source = ScriptedSource::default();
    let log = source.call_log();
    let mut loader = FragmentLoader::new(
        catalog(&[("a.txt", "a"), ("b.txt", "b"), ("c.txt", "c")]),
        source,
        RecordingBinder::default(),
    );

    let status = loader.run().await;

    assert!(status.finished);
    assert!(status.loaded.is_empty());
    assert_eq!(loader.state().passes, 1);
    for fragment in ["a.txt", "b.txt", "c.txt"] {
        assert_eq!(calls(&log, fragment), 1);
    }
}

#[tokio::test(start_paused = true)]
async fn all_present_loads_everything_in_one_pass() {
    let source = ScriptedSource::default()
        .reply("a.txt", [text("# A")])
        .reply("b.txt", [text("b body")]);
    let mut loader = FragmentLoader::new(
        catalog(&[("a.txt", "a"), ("b.txt", "b")]),
        source,
        RecordingBinder::default(),
    );

    let status = loader.run().await;

    assert_eq!(loader.state().passes, 1);
    assert_eq!(
        status.loaded,
        [FragmentId::from("a.txt"), FragmentId::from("b.txt")]
    );
    assert_eq!(status.total, 2);
    let binder = loader.into_binder();
    assert_eq!(
        binder.bound[0],
        (
            FragmentId::from("a.txt"),
            TargetId::new("a"),
            BoundContent::Html("<h1>A</h1>".to_string())
        )
    );
}

#[tokio::test]
async fn loaded_fragments_are_never_fetched_again() {
    let source = ScriptedSource::default()
        .reply("a.txt", [text("alpha")])
        .reply("b.txt", [Err(FetchError::NotFound)]);
    let log = source.call_log();
    let mut loader = FragmentLoader::new(
        catalog(&[("a.txt", "a"), ("b.txt", "b")]),
        source,
        RecordingBinder::default(),
    );

    let first = loader.poll_once().await;
    assert_eq!(first.gained, 1);
    assert!(!first.finished);

    for _ in 0..3 {
        let outcome = loader.poll_once().await;
        assert_eq!(outcome.gained, 0);
        assert!(!outcome.finished);
    }

    assert_eq!(calls(&log, "a.txt"), 1);
    assert_eq!(calls(&log, "b.txt"), 4);
    assert_eq!(loader.state().attempts_since_last_gain, 3);
    assert_eq!(loader.state().remaining, 1);
}

#[tokio::test]
async fn late_fragment_is_picked_up_on_a_later_pass() {
    let source = ScriptedSource::default()
        .reply("a.txt", [text("alpha")])
        .reply(
            "b.txt",
            [
                Err(FetchError::NotFound),
                Err(FetchError::transport("connection reset")),
                text("- item"),
            ],
        );
    let mut loader = FragmentLoader::new(
        catalog(&[("a.txt", "a"), ("b.txt", "b")]),
        source,
        RecordingBinder::default(),
    );

    assert_eq!(loader.poll_once().await.gained, 1);
    assert_eq!(loader.poll_once().await.gained, 0);
    let third = loader.poll_once().await;
    assert_eq!(third.gained, 1);
    assert!(third.finished);
    assert!(loader.is_finished());

    let binder = loader.binder();
    assert_eq!(
        binder.bound[1].2,
        BoundContent::Html("<ul>\n<li>item</li>\n</ul>".to_string())
    );
}

#[tokio::test]
async fn failures_are_only_reported_on_the_first_pass() {
    let source = ScriptedSource::default()
        .reply("a.txt", [text("alpha")])
        .reply("b.txt", [Err(FetchError::NotFound)])
        .reply("c.txt", [Err(FetchError::transport("timed out"))]);
    let mut loader = FragmentLoader::new(
        catalog(&[("a.txt", "a"), ("b.txt", "b"), ("c.txt", "c")])
            .with_unmapped("d.txt")
            .expect("valid catalog"),
        source,
        RecordingBinder::default(),
    );

    let first = loader.poll_once().await;
    assert_eq!(
        event_names(&first),
        ["loaded", "not-found", "transport-error", "unmapped"]
    );
    assert_eq!(
        first.events[2],
        LoadEvent::TransportError {
            fragment: FragmentId::from("c.txt"),
            message: "timed out".to_string(),
        }
    );

    let second = loader.poll_once().await;
    assert!(second.events.is_empty());
}

#[tokio::test]
async fn empty_fragment_is_terminal_on_first_pass() {
    let source = ScriptedSource::default()
        .reply("a.txt", [text("  \n\n ")])
        .reply("b.txt", [Err(FetchError::NotFound)]);
    let log = source.call_log();
    let mut loader = FragmentLoader::new(
        catalog(&[("a.txt", "a"), ("b.txt", "b")]),
        source,
        RecordingBinder::default(),
    );

    let first = loader.poll_once().await;
    assert_eq!(first.gained, 1);
    assert_eq!(event_names(&first), ["loaded-empty", "not-found"]);
    assert!(loader.loaded().contains(&FragmentId::from("a.txt")));

    loader.poll_once().await;
    assert_eq!(calls(&log, "a.txt"), 1);
    assert_eq!(
        loader.binder().bound,
        [(
            FragmentId::from("a.txt"),
            TargetId::new("a"),
            BoundContent::Plain
        )]
    );
}

#[tokio::test]
async fn empty_fragment_after_first_pass_is_skipped_silently() {
    let source = ScriptedSource::default()
        .reply("a.txt", [text("alpha")])
        .reply("b.txt", [Err(FetchError::NotFound), text("")]);
    let log = source.call_log();
    let mut loader = FragmentLoader::new(
        catalog(&[("a.txt", "a"), ("b.txt", "b")]),
        source,
        RecordingBinder::default(),
    );

    loader.poll_once().await;
    let second = loader.poll_once().await;
    let third = loader.poll_once().await;

    assert!(second.events.is_empty());
    assert!(third.events.is_empty());
    assert!(!loader.loaded().contains(&FragmentId::from("b.txt")));
    assert_eq!(calls(&log, "b.txt"), 3);
}

#[tokio::test]
async fn missing_page_target_is_never_marked_loaded() {
    let source = ScriptedSource::default()
        .reply("a.txt", [text("alpha")])
        .reply("b.txt", [text("beta")]);
    let log = source.call_log();
    let mut loader = FragmentLoader::new(
        catalog(&[("a.txt", "a"), ("b.txt", "b")]),
        source,
        RecordingBinder::without("b"),
    );

    let first = loader.poll_once().await;
    assert_eq!(event_names(&first), ["loaded", "unmapped"]);
    assert!(!first.finished);

    let second = loader.poll_once().await;
    assert!(second.events.is_empty());
    assert!(!loader.loaded().contains(&FragmentId::from("b.txt")));
    assert_eq!(calls(&log, "b.txt"), 2);
}

#[tokio::test]
async fn rewrite_failure_is_reported_apart_from_unmapped() {
    let source = ScriptedSource::default()
        .reply("a.txt", [text("alpha")])
        .reply("b.txt", [text("beta")]);
    let mut loader = FragmentLoader::new(
        catalog(&[("a.txt", "a"), ("b.txt", "b")]),
        source,
        RecordingBinder::failing_rewrite("a"),
    );

    let first = loader.poll_once().await;
    assert_eq!(event_names(&first), ["bind-failed", "loaded"]);
    assert_eq!(
        first.events[0],
        LoadEvent::BindFailed {
            fragment: FragmentId::from("a.txt"),
            message: "parser stalled".to_string(),
        }
    );
    assert!(!loader.loaded().contains(&FragmentId::from("a.txt")));

    let second = loader.poll_once().await;
    assert!(second.events.is_empty());
}

#[tokio::test]
async fn unmapped_fragment_is_not_fetched() {
    let source = ScriptedSource::default().reply("orphan.txt", [text("orphan")]);
    let log = source.call_log();
    let mut loader = FragmentLoader::new(
        FragmentCatalog::from_pairs(Vec::<(String, String)>::new())
            .and_then(|catalog| catalog.with_unmapped("orphan.txt"))
            .expect("valid catalog"),
        source,
        RecordingBinder::default(),
    );

    let outcome = loader.poll_once().await;

    assert_eq!(event_names(&outcome), ["unmapped", "complete"]);
    assert!(outcome.finished);
    assert_eq!(calls(&log, "orphan.txt"), 0);
}

#[tokio::test]
async fn finished_loader_does_no_further_work() {
    let source = ScriptedSource::default();
    let log = source.call_log();
    let mut loader = FragmentLoader::new(
        catalog(&[("a.txt", "a")]),
        source,
        RecordingBinder::default(),
    );

    let first = loader.poll_once().await;
    assert!(first.finished);
    assert_eq!(
        first.events.last(),
        Some(&LoadEvent::Complete {
            loaded: 0,
            total: 1
        })
    );

    let again = loader.poll_once().await;
    assert!(again.finished);
    assert!(again.events.is_empty());
    assert_eq!(calls(&log, "a.txt"), 1);
    assert_eq!(loader.state().passes, 1);
}

#[tokio::test(start_paused = true)]
async fn run_waits_the_poll_interval_between_passes() {
    let source = ScriptedSource::default()
        .reply("a.txt", [text("alpha")])
        .reply(
            "b.txt",
            [Err(FetchError::NotFound), Err(FetchError::NotFound), text("beta")],
        );
    let mut loader = FragmentLoader::new(
        catalog(&[("a.txt", "a"), ("b.txt", "b")]),
        source,
        RecordingBinder::default(),
    )
    .with_poll_interval(Duration::from_millis(3000));

    let started = tokio::time::Instant::now();
    let status = loader.run().await;

    assert_eq!(loader.state().passes, 3);
    assert_eq!(started.elapsed(), Duration::from_millis(6000));
    assert_eq!(status.loaded.len(), 2);
    assert!(status.finished);
}

#[tokio::test]
async fn renders_through_custom_renderer() {
    struct Shouting;

    impl RenderService for Shouting {
        fn render(&self, raw: &str) -> String {
            raw.to_uppercase()
        }
    }

    let source = ScriptedSource::default().reply("a.txt", [text("quiet")]);
    let mut loader = FragmentLoader::with_renderer(
        catalog(&[("a.txt", "a")]),
        source,
        RecordingBinder::default(),
        Shouting,
    );

    loader.poll_once().await;

    assert_eq!(
        loader.binder().bound[0].2,
        BoundContent::Html("QUIET".to_string())
    );
}
