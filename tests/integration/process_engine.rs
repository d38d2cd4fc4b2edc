// tests/integration/process_engine.rs
//
// Drives ProcessEngine against a tiny POSIX shell bridge that speaks the
// JSON-lines protocol.

#![cfg(unix)]

use std::error::Error;
use std::path::Path;
use std::time::Duration;

use isoforge::exec::{Command, EngineBackend, EngineFault, ExecutionPool, ModuleLocator, PoolOptions, ProcessEngine};
use isoforge::fs::RealFileSystem;
use isoforge::types::LogCategory;
use isoforge_test_utils::{init_tracing, recording_host, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

const BRIDGE: &str = r#"
while IFS= read -r line; do
  case "$line" in
    *'"op":"import"'*)
      echo '{"kind":"done"}' ;;
    *'"op":"exit"'*)
      exit 0 ;;
    *'"verb":"Get-MediaToolList"'*)
      echo '{"kind":"verbose","text":"listing products"}'
      echo 'plain output'
      echo '{"kind":"progress","source_id":1,"percent":250,"activity":"Listing"}'
      echo '{"kind":"row","fields":{"Version":"11"}}'
      echo '{"kind":"row","fields":{"Version":"10","Build":19045}}'
      echo '{"kind":"done"}' ;;
    *'"verb":"Echo"'*)
      echo "$line"
      echo '{"kind":"done"}' ;;
    *'"verb":"New-MediaToolMedia"'*)
      echo '{"kind":"prompt","capability":"prompt_for_choice"}'
      IFS= read -r answer
      case "$answer" in
        *'"op":"reject"'*) echo '{"kind":"failed","message":"choice rejected"}' ;;
        *) echo '{"kind":"done"}' ;;
      esac ;;
    *'"verb":"Broken"'*)
      echo 'disk on fire' >&2
      echo '{"kind":"failed","message":"it broke"}' ;;
    *'"verb":"Crash"'*)
      exit 3 ;;
    *'"verb":"Latin1"'*)
      printf '{"kind":"line","text":"Espa\351ol"}\n'
      printf 'caf\351\n' >&2
      echo '{"kind":"row","fields":{"From":"latin1"}}'
      echo '{"kind":"done"}' ;;
    *'"verb":"Next"'*)
      echo '{"kind":"row","fields":{"From":"next"}}'
      echo '{"kind":"done"}' ;;
    *)
      echo '{"kind":"done"}' ;;
  esac
done
"#;

fn bridge() -> ProcessEngine {
    ProcessEngine::new("sh", vec!["-c".to_string(), BRIDGE.to_string()])
}

const MODULE: &str = "/opt/isoforge/Modules/MediaTool";

#[tokio::test]
async fn rows_and_output_records_are_routed() -> TestResult {
    init_tracing();
    let (host, sink) = recording_host();
    let mut engine = bridge();
    engine.open(Path::new(MODULE), host).await?;

    let rows = with_timeout(engine.invoke(Command::builder("Get-MediaToolList").build())).await?;

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].display("Version").as_deref(), Some("11"));
    assert_eq!(rows[1].display("Build").as_deref(), Some("19045"));
    assert_eq!(sink.texts(LogCategory::Verbose), vec!["listing products"]);
    assert_eq!(sink.texts(LogCategory::Text), vec!["plain output"]);
    let progress = sink.progress();
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0].percent, 100);
    assert_eq!(progress[0].activity.as_deref(), Some("Listing"));

    engine.close().await?;
    Ok(())
}

#[tokio::test]
async fn parameters_travel_as_name_value_pairs() -> TestResult {
    init_tracing();
    let (host, sink) = recording_host();
    let mut engine = bridge();
    engine.open(Path::new(MODULE), host).await?;

    let cmd = Command::builder("Echo")
        .param("Product", "11")
        .switch("Verbose")
        .build();
    with_timeout(engine.invoke(cmd)).await?;

    let echoed = sink.texts(LogCategory::Text).join("\n");
    assert!(echoed.contains(r#""verb":"Echo""#), "{echoed}");
    assert!(echoed.contains(r#"{"name":"Product","value":"11"}"#), "{echoed}");
    assert!(echoed.contains(r#"{"name":"Verbose"}"#), "{echoed}");

    engine.close().await?;
    Ok(())
}

#[tokio::test]
async fn prompts_are_rejected_and_reported_as_unsupported() -> TestResult {
    init_tracing();
    let (host, sink) = recording_host();
    let mut engine = bridge();
    engine.open(Path::new(MODULE), host).await?;

    let err = with_timeout(engine.invoke(Command::builder("New-MediaToolMedia").build()))
        .await
        .unwrap_err();

    assert_eq!(err, EngineFault::Unsupported("prompt_for_choice".to_string()));
    assert_eq!(sink.errors().len(), 1);

    // The bridge is still usable afterwards.
    let rows = with_timeout(engine.invoke(Command::builder("Get-MediaToolList").build())).await?;
    assert_eq!(rows.len(), 2);

    engine.close().await?;
    Ok(())
}

#[tokio::test]
async fn failures_and_stderr_reach_the_host() -> TestResult {
    init_tracing();
    let (host, sink) = recording_host();
    let mut engine = bridge();
    engine.open(Path::new(MODULE), host).await?;

    let err = with_timeout(engine.invoke(Command::builder("Broken").build()))
        .await
        .unwrap_err();
    assert_eq!(err, EngineFault::script("it broke"));

    with_timeout(async {
        while !sink.errors().iter().any(|e| e == "disk on fire") {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;

    engine.close().await?;
    Ok(())
}

#[tokio::test]
async fn a_dead_bridge_is_a_transport_fault() -> TestResult {
    init_tracing();
    let (host, _sink) = recording_host();
    let mut engine = bridge();
    engine.open(Path::new(MODULE), host).await?;

    let err = with_timeout(engine.invoke(Command::builder("Crash").build()))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineFault::Transport(_)), "got {err:?}");

    // The broken context is gone; later commands fail instead of reading
    // whatever was left behind.
    let err = with_timeout(engine.invoke(Command::builder("Next").build()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineFault::Transport(ref m) if m.contains("earlier fault")), "got {err:?}");

    engine.close().await?;
    Ok(())
}

#[tokio::test]
async fn undecodable_bytes_do_not_leak_rows_into_the_next_command() -> TestResult {
    init_tracing();
    let (host, sink) = recording_host();
    let mut engine = bridge();
    engine.open(Path::new(MODULE), host).await?;

    let first = with_timeout(engine.invoke(Command::builder("Latin1").build())).await?;
    let second = with_timeout(engine.invoke(Command::builder("Next").build())).await?;

    assert_eq!(first.len(), 1);
    assert_eq!(first[0].display("From").as_deref(), Some("latin1"));
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].display("From").as_deref(), Some("next"));

    let lines = sink.texts(LogCategory::Text);
    assert!(lines.iter().any(|l| l.starts_with("Espa") && l.ends_with("ol")), "{lines:?}");
    with_timeout(async {
        while !sink.errors().iter().any(|e| e.starts_with("caf")) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;

    engine.close().await?;
    Ok(())
}

#[tokio::test]
async fn missing_interpreter_fails_to_open() {
    init_tracing();
    let (host, _sink) = recording_host();
    let mut engine = ProcessEngine::new("/nonexistent/isoforge-bridge", Vec::new());

    let err = engine.open(Path::new(MODULE), host).await.unwrap_err();

    assert!(matches!(err, EngineFault::Transport(ref m) if m.contains("spawning")));
}

#[tokio::test]
async fn pool_over_a_real_bridge() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    std::fs::create_dir(dir.path().join("Modules"))?;
    let locator = ModuleLocator::new(vec![dir.path().join("Modules")], "MediaTool");
    let (host, _sink) = recording_host();

    let pool = ExecutionPool::open(
        host,
        &locator,
        &RealFileSystem,
        Box::new(bridge()),
        PoolOptions::default(),
    )
    .await?;

    let rows = with_timeout(pool.submit(Command::builder("Get-MediaToolList").build())).await?;
    assert_eq!(rows.len(), 2);

    with_timeout(pool.close()).await?;
    assert!(pool.is_closed());
    Ok(())
}
