//! Event queue and dispatch.
//!
//! Inbound platform activity (joins, messages, moderator commands) lands on
//! one mpsc queue and is handled strictly one event at a time, each to
//! completion before the next is dequeued. Decisions (scoring, trust
//! transitions) are computed synchronously; the only suspension points are
//! remote reads and mutations through the gateway. For a single member this
//! yields arrival-order transitions; across members no ordering is promised.
//!
//! A fresh Directory snapshot is fetched per event rather than cached across
//! events, trading a read per event for freedom from stale-read hazards.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::directory::Directory;
use crate::gateway::{ChannelId, Gateway, MemberId, MessageId};
use crate::handlers::{self, ModCommand, Reply};
use crate::security::{JoinScreening, TrustEngine, Verdict, risk};
use crate::store::WebhookStore;

/// Queue depth before senders back-pressure.
const EVENT_QUEUE_DEPTH: usize = 256;

/// One inbound event.
#[derive(Debug)]
pub enum Event {
    MemberJoined {
        member: MemberId,
        account_created: DateTime<Utc>,
    },
    MessageCreated {
        message: MessageId,
        channel: ChannelId,
        author: MemberId,
        author_is_bot: bool,
        content: String,
    },
    Command {
        issuer: MemberId,
        command: ModCommand,
        /// Where the informational reply goes.
        reply_to: ChannelId,
    },
}

/// Single-threaded cooperative event processor.
pub struct EventLoop {
    config: Arc<Config>,
    gateway: Arc<dyn Gateway>,
    trust: TrustEngine,
    store: WebhookStore,
    rx: mpsc::Receiver<Event>,
}

impl EventLoop {
    /// Build the loop and the sender half of its queue.
    pub fn new(config: Arc<Config>, gateway: Arc<dyn Gateway>) -> (Self, mpsc::Sender<Event>) {
        let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
        let store = WebhookStore::new(&config.space.webhook_snapshot);
        (
            Self {
                config,
                gateway,
                trust: TrustEngine::new(),
                store,
                rx,
            },
            tx,
        )
    }

    /// Process events until every sender is dropped.
    pub async fn run(mut self) {
        while let Some(event) = self.rx.recv().await {
            self.handle(event).await;
        }
        info!("event queue closed, loop exiting");
    }

    async fn handle(&mut self, event: Event) {
        match event {
            Event::MemberJoined {
                member,
                account_created,
            } => self.on_member_joined(member, account_created).await,
            Event::MessageCreated {
                message,
                channel,
                author,
                author_is_bot,
                content,
            } => {
                self.on_message(message, channel, author, author_is_bot, &content)
                    .await
            }
            Event::Command {
                issuer,
                command,
                reply_to,
            } => self.on_command(issuer, command, reply_to).await,
        }
    }

    async fn on_member_joined(&mut self, member: MemberId, account_created: DateTime<Utc>) {
        let screening = self.trust.screen_join(member, account_created, Utc::now());
        match screening {
            JoinScreening::Quarantine { account_age_days } => {
                info!(
                    member = %member,
                    account_age_days,
                    "applying quarantine role on join"
                );
                let Some(role_name) = self
                    .config
                    .topology
                    .quarantine_role()
                    .map(|r| r.name.clone())
                else {
                    warn!("no quarantine role in topology, join screening has no effect");
                    return;
                };
                let directory = match Directory::fetch(self.gateway.as_ref()).await {
                    Ok(directory) => directory,
                    Err(err) => {
                        error!(error = %err, "could not fetch directory for join screening");
                        return;
                    }
                };
                let Some(role) = directory.find_role(&role_name) else {
                    warn!(role = %role_name, "quarantine role missing remotely, run provisioning");
                    return;
                };
                if let Err(err) = self.gateway.add_role(member, role.id).await {
                    error!(
                        member = %member,
                        error = %err,
                        code = err.error_code(),
                        "failed to apply quarantine role"
                    );
                }
            }
            // The engine already logged the low-confidence warning.
            JoinScreening::Watch { .. } | JoinScreening::Clear => {}
        }
    }

    async fn on_message(
        &mut self,
        message: MessageId,
        channel: ChannelId,
        author: MemberId,
        author_is_bot: bool,
        content: &str,
    ) {
        if author_is_bot {
            return;
        }
        let verdict = risk::score(content, &self.config.moderation.automod);
        let (reason, notice, expire) = match verdict {
            Verdict::Allow => return,
            Verdict::WarnAndDelete {
                reason,
                notice,
                notice_expire_secs,
            }
            | Verdict::BlockAndDelete {
                reason,
                notice,
                notice_expire_secs,
            } => (reason, notice, notice_expire_secs),
        };

        info!(
            message = %message,
            author = %author,
            reason = %reason,
            "message flagged, remediating"
        );
        if let Err(err) = self.gateway.delete_message(message).await {
            error!(message = %message, error = %err, "failed to delete flagged message");
            // Without the delete the notice would dangle; stop here.
            return;
        }
        let text = format!("<@{author}>, {notice}");
        if let Err(err) = self
            .gateway
            .send_notice(channel, &text, Some(expire))
            .await
        {
            error!(channel = %channel, error = %err, "failed to send moderation notice");
        }
    }

    async fn on_command(&mut self, issuer: MemberId, command: ModCommand, reply_to: ChannelId) {
        debug!(issuer = %issuer, command = command.name(), "dispatching command");
        let mut directory = match Directory::fetch(self.gateway.as_ref()).await {
            Ok(directory) => directory,
            Err(err) => {
                error!(error = %err, "could not fetch directory for command");
                return;
            }
        };
        let mut ctx = handlers::Context {
            config: &self.config,
            directory: &mut directory,
            trust: &self.trust,
            gateway: self.gateway.as_ref(),
            store: &self.store,
        };
        let reply: Reply = handlers::dispatch(&mut ctx, command).await;
        if let Err(err) = self
            .gateway
            .send_notice(reply_to, reply.text(), None)
            .await
        {
            error!(channel = %reply_to, error = %err, "failed to deliver command reply");
        }
    }

    /// Trust engine accessor for embedding callers.
    pub fn trust(&self) -> &TrustEngine {
        &self.trust
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TopologySpec;
    use crate::directory::Directory as Dir;
    use crate::gateway::{RecordedCall, RecordingGateway};
    use crate::provision::reconcile;
    use crate::security::TrustState;
    use chrono::Duration;

    fn test_config(dir: &tempfile::TempDir) -> Arc<Config> {
        let mut config: Config = toml::from_str(
            r#"
[space]
name = "TestSpace"
"#,
        )
        .unwrap();
        config.space.webhook_snapshot = dir
            .path()
            .join("hooks.json")
            .to_string_lossy()
            .into_owned();
        Arc::new(config)
    }

    async fn provisioned_gateway() -> Arc<RecordingGateway> {
        let gateway = Arc::new(RecordingGateway::new());
        let topology = TopologySpec::default();
        let mut directory = Dir::fetch(gateway.as_ref()).await.unwrap();
        reconcile(&topology, &mut directory, gateway.as_ref()).await;
        gateway
    }

    #[tokio::test]
    async fn brand_new_account_gets_quarantine_role_on_join() {
        let tmp = tempfile::tempdir().unwrap();
        let gateway = provisioned_gateway().await;
        let member = gateway.seed_member("fresh", Utc::now() - Duration::hours(2));

        let (event_loop, tx) =
            EventLoop::new(test_config(&tmp), gateway.clone());
        tx.send(Event::MemberJoined {
            member,
            account_created: Utc::now() - Duration::hours(2),
        })
        .await
        .unwrap();
        drop(tx);
        event_loop.run().await;

        let quarantine_role = gateway
            .list_roles()
            .await
            .unwrap()
            .into_iter()
            .find(|r| r.name == "⚠️ Quarantine")
            .unwrap();
        assert_eq!(gateway.member_roles(member), vec![quarantine_role.id]);
    }

    #[tokio::test]
    async fn aged_account_join_has_no_side_effects() {
        let tmp = tempfile::tempdir().unwrap();
        let gateway = provisioned_gateway().await;
        let member = gateway.seed_member("veteran", Utc::now() - Duration::days(400));
        let before = gateway.mutation_count();

        let (event_loop, tx) =
            EventLoop::new(test_config(&tmp), gateway.clone());
        tx.send(Event::MemberJoined {
            member,
            account_created: Utc::now() - Duration::days(400),
        })
        .await
        .unwrap();
        drop(tx);
        event_loop.run().await;

        assert_eq!(gateway.mutation_count(), before);
    }

    #[tokio::test]
    async fn flagged_message_is_deleted_with_notice() {
        let tmp = tempfile::tempdir().unwrap();
        let gateway = provisioned_gateway().await;
        let author = gateway.seed_member("shouter", Utc::now() - Duration::days(30));

        let (event_loop, tx) =
            EventLoop::new(test_config(&tmp), gateway.clone());
        tx.send(Event::MessageCreated {
            message: MessageId(500),
            channel: ChannelId(10),
            author,
            author_is_bot: false,
            content: "THIS IS ABSOLUTELY INSANE".into(),
        })
        .await
        .unwrap();
        drop(tx);
        event_loop.run().await;

        let calls = gateway.calls();
        assert!(calls.contains(&RecordedCall::DeleteMessage {
            message: MessageId(500)
        }));
        assert!(calls.iter().any(|c| matches!(
            c,
            RecordedCall::SendNotice { channel, auto_expire_secs: Some(10), .. }
                if *channel == ChannelId(10)
        )));
    }

    #[tokio::test]
    async fn bot_messages_are_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let gateway = provisioned_gateway().await;
        let before = gateway.mutation_count();

        let (event_loop, tx) =
            EventLoop::new(test_config(&tmp), gateway.clone());
        tx.send(Event::MessageCreated {
            message: MessageId(1),
            channel: ChannelId(10),
            author: MemberId(1),
            author_is_bot: true,
            content: "bit.ly/totally-fine-for-bots".into(),
        })
        .await
        .unwrap();
        drop(tx);
        event_loop.run().await;

        assert_eq!(gateway.mutation_count(), before);
    }

    #[tokio::test]
    async fn command_reply_reaches_the_issuing_channel() {
        let tmp = tempfile::tempdir().unwrap();
        let gateway = provisioned_gateway().await;
        let member = gateway.seed_member("mod", Utc::now() - Duration::days(200));

        let (event_loop, tx) =
            EventLoop::new(test_config(&tmp), gateway.clone());
        tx.send(Event::Command {
            issuer: member,
            command: ModCommand::SecurityStatus,
            reply_to: ChannelId(42),
        })
        .await
        .unwrap();
        drop(tx);
        event_loop.run().await;

        assert!(gateway.calls().iter().any(|c| matches!(
            c,
            RecordedCall::SendNotice { channel, text, .. }
                if *channel == ChannelId(42) && text.contains("Security Status")
        )));
    }

    #[tokio::test]
    async fn member_events_are_ordered_per_member() {
        let tmp = tempfile::tempdir().unwrap();
        let gateway = provisioned_gateway().await;
        let member = gateway.seed_member("fresh", Utc::now());

        let (event_loop, tx) =
            EventLoop::new(test_config(&tmp), gateway.clone());
        // Join (quarantines), then an unquarantine command: must resolve in
        // that order, leaving the member verified.
        tx.send(Event::MemberJoined {
            member,
            account_created: Utc::now(),
        })
        .await
        .unwrap();
        tx.send(Event::Command {
            issuer: member,
            command: ModCommand::Unquarantine { member },
            reply_to: ChannelId(1),
        })
        .await
        .unwrap();
        drop(tx);

        assert_eq!(event_loop.trust().state(member), TrustState::New);
        event_loop.run().await;

        // Verified role applied, quarantine role removed.
        let roles = gateway.list_roles().await.unwrap();
        let verified = roles.iter().find(|r| r.name == "✅ Verified").unwrap().id;
        assert_eq!(gateway.member_roles(member), vec![verified]);
    }
}
