//! Subcommand implementations.

use aim_gateway::{EventFeed, ReadGateway, RelayClient, WsEventFeed};
use aim_history::{HistoryFollower, HistoryView, EMPTY_HISTORY_MESSAGE};
use aim_synchronizer::{AccountContext, Phase, Session, Synchronizer};
use aim_types::{AccountAddress, CompletionRecord, RequestId};
use aim_utils::{format_elapsed, ShutdownController};
use anyhow::{bail, Context};
use std::sync::Arc;
use std::time::Instant;

use crate::config::ClientConfig;

pub const NO_CONSTITUTION_MESSAGE: &str = "No constitution has been set yet.";

fn relay(config: &ClientConfig) -> anyhow::Result<RelayClient> {
    RelayClient::new(config.node_url.clone()).context("creating relay client")
}

pub async fn constitution(config: &ClientConfig) -> anyhow::Result<()> {
    let relay = relay(config)?;
    if !relay.constitution_set().await? {
        println!("{NO_CONSTITUTION_MESSAGE}");
        return Ok(());
    }
    println!("{}", relay.constitution().await?);
    Ok(())
}

pub async fn fee(config: &ClientConfig) -> anyhow::Result<()> {
    let fee = relay(config)?.estimate_fee().await?;
    println!("{fee}");
    Ok(())
}

pub async fn result(config: &ClientConfig, id: u64) -> anyhow::Result<()> {
    let record = relay(config)?
        .proposal_result(RequestId::new(id))
        .await
        .with_context(|| format!("reading result of request {id}"))?;
    print_record(&record);
    Ok(())
}

/// Submit `text` from `account` and follow it until it reaches a terminal
/// phase or the user interrupts.
pub async fn submit(
    config: &ClientConfig,
    account: AccountAddress,
    text: String,
    shutdown: &ShutdownController,
) -> anyhow::Result<()> {
    let relay = relay(config)?;
    let feed = WsEventFeed::new(config.ws_url.clone(), relay.clone());
    let confirmations = feed
        .subscribe_submissions()
        .await
        .context("subscribing to submission events")?;

    let relay = Arc::new(relay);
    let mut sync = Synchronizer::new(
        config.sync.clone(),
        AccountContext::connected(account),
        relay.clone(),
        relay,
    );
    sync.on_abandon(|session| {
        tracing::warn!(session = %session.id, attempts = session.poll_attempts, "gave up waiting for evaluation");
    });

    let (handle, task) = sync.spawn(confirmations, shutdown.subscribe());
    let started = Instant::now();

    match handle.submit(text).await {
        Ok(id) => tracing::info!(session = %id, "waiting for request id"),
        Err(e) if e.is_precondition() => bail!("{e}"),
        Err(e) => {
            shutdown.shutdown();
            let _ = task.await;
            return Err(e).context("submission failed");
        }
    }

    let mut snapshots = handle.subscribe();
    let mut last = Phase::Submitting;
    let outcome = loop {
        let current = snapshots.borrow_and_update().clone();
        if let Some(session) = current {
            if session.phase != last {
                println!("{}", session.phase);
                last = session.phase;
            }
            if session.phase.is_terminal() {
                break Some(session);
            }
        }
        if snapshots.changed().await.is_err() {
            break None;
        }
    };

    shutdown.shutdown();
    task.await.context("synchronizer task")?;

    match outcome {
        Some(session) => print_session(&session, started),
        None => println!("interrupted before the evaluation completed"),
    }
    Ok(())
}

/// Print the newest evaluations; with `follow`, keep printing new ones.
pub async fn history(
    config: &ClientConfig,
    window: Option<usize>,
    follow: bool,
    shutdown: &ShutdownController,
) -> anyhow::Result<()> {
    let relay = relay(config)?;
    let feed = Arc::new(WsEventFeed::new(config.ws_url.clone(), relay));
    let follower = HistoryFollower::new(feed, config.history.clone());
    if let Some(window) = window {
        follower.view().write().await.set_window(window);
    }

    if !follow {
        follower.load().await.context("loading evaluation history")?;
        print_view(&*follower.view().read().await);
        return Ok(());
    }

    let mut updates = follower.subscribe();
    let view = follower.view();
    let printer = tokio::spawn(async move {
        let mut printed = 0;
        while updates.changed().await.is_ok() {
            let total = *updates.borrow_and_update();
            if total > printed {
                print_view(&*view.read().await);
                printed = total;
            }
        }
    });

    follower.run(shutdown.subscribe()).await?;
    printer.abort();
    Ok(())
}

fn print_view(view: &HistoryView) {
    if view.is_empty() {
        println!("{EMPTY_HISTORY_MESSAGE}");
        return;
    }
    for entry in view.visible() {
        println!(
            "#{:<6} {:<9} {}  {}",
            entry.request_id.raw(),
            entry.decision.as_str(),
            entry.proposer.short(),
            entry.proposal
        );
        println!("        {}", entry.result);
    }
    if view.has_more() {
        println!(
            "showing {} of {} evaluations (use --window for more)",
            view.window(),
            view.len()
        );
    }
}

fn print_record(record: &CompletionRecord) {
    println!("request:   {}", record.request_id);
    println!("proposal:  {}", record.proposal);
    match record.decision() {
        Some(decision) => {
            println!("decision:  {decision}");
            println!("result:    {}", record.result);
        }
        None => println!("status:    pending"),
    }
}

fn print_session(session: &Session, started: Instant) {
    let elapsed = format_elapsed(started.elapsed());
    match session.phase {
        Phase::Completed => {
            if let Some(record) = &session.record {
                print_record(record);
            }
            println!("elapsed:   {elapsed}");
        }
        Phase::Errored => {
            println!(
                "submission failed: {}",
                session.error.as_deref().unwrap_or("unknown error")
            );
        }
        Phase::Abandoned => {
            let id = session
                .request_id
                .map_or_else(|| "?".to_string(), |id| id.to_string());
            println!(
                "no result after {} reads ({elapsed}); check later with `aim result --id {id}`",
                session.poll_attempts
            );
        }
        other => println!("stopped while {other}"),
    }
}
