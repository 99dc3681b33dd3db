use gitmad::source::InputBuffer;
use gitmad::{SessionController, SessionStatus, SubmitOutcome};
use std::time::Duration;

#[path = "test_utils.rs"]
mod test_utils;
use test_utils::{FakeFetcher, Reply, ScriptedGenerator, client_for, roast_json};

const LINK: &str = "https://github.com/acme/widgets/blob/main/src/index.ts";
const RAW: &str = "https://raw.githubusercontent.com/acme/widgets/main/src/index.ts";
const RAW_HOST: &str = "raw.githubusercontent.com";

#[tokio::test(start_paused = true)]
async fn test_link_is_replaced_by_file_contents() {
    let fetcher = FakeFetcher::serving("export const x = 1;", Duration::from_millis(50));
    let buffer = InputBuffer::new(fetcher.clone(), RAW_HOST);

    let handle = buffer.set_text(LINK).expect("link starts a fetch");
    assert!(buffer.is_fetching());
    assert_eq!(buffer.text(), LINK);

    handle.await.expect("fetch task");
    assert!(!buffer.is_fetching());
    assert_eq!(buffer.text(), "export const x = 1;");
    assert_eq!(fetcher.urls.lock().as_slice(), [RAW.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_failed_fetch_keeps_link() {
    let fetcher = FakeFetcher::failing(404, Duration::from_millis(50));
    let buffer = InputBuffer::new(fetcher, RAW_HOST);

    let handle = buffer.set_text(format!("  {LINK}\n")).expect("fetch");
    handle.await.expect("fetch task");

    assert!(!buffer.is_fetching());
    assert_eq!(buffer.text(), format!("  {LINK}\n"));
}

#[tokio::test(start_paused = true)]
async fn test_edit_during_fetch_wins() {
    let fetcher = FakeFetcher::serving("fetched", Duration::from_millis(50));
    let buffer = InputBuffer::new(fetcher, RAW_HOST);

    let handle = buffer.set_text(LINK).expect("fetch");
    assert!(buffer.set_text("typed by hand").is_none());

    handle.await.expect("fetch task");
    assert_eq!(buffer.text(), "typed by hand");
}

#[tokio::test]
async fn test_plain_text_does_not_fetch() {
    let fetcher = FakeFetcher::serving("never", Duration::ZERO);
    let buffer = InputBuffer::new(fetcher.clone(), RAW_HOST);

    assert!(buffer.set_text("https://github.com/acme/widgets").is_none());
    assert!(buffer.set_text("console.log(1)").is_none());
    assert!(!buffer.is_fetching());
    assert!(fetcher.urls.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_submit_waits_for_fetch_and_content() {
    let generator = ScriptedGenerator::new([Reply::ok(roast_json("The Spaghetti Chef"))]);
    let controller = SessionController::new(client_for(&generator), Duration::ZERO);
    let fetcher = FakeFetcher::serving("while(true){}", Duration::from_millis(50));
    let buffer = InputBuffer::new(fetcher, RAW_HOST);

    assert_eq!(buffer.submit(&controller).await, SubmitOutcome::Ignored);
    let _ = buffer.set_text("   ");
    assert_eq!(buffer.submit(&controller).await, SubmitOutcome::Ignored);

    let handle = buffer.set_text(LINK).expect("fetch");
    assert_eq!(buffer.pending_submission(), None);
    assert_eq!(buffer.submit(&controller).await, SubmitOutcome::Ignored);
    assert_eq!(generator.calls(), 0);

    handle.await.expect("fetch task");
    assert_eq!(
        buffer.submit(&controller).await,
        SubmitOutcome::Applied(SessionStatus::Success)
    );
    assert_eq!(controller.snapshot().current_code, "while(true){}");
}
