//! Trust lifecycle driven through the event queue: screening on join,
//! message remediation, and moderator commands end to end.

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use common::{fixture_config, run_provisioning};
use wardend::events::{Event, EventLoop};
use wardend::gateway::{ChannelId, Gateway, MemberId, MessageId, RecordedCall, RecordingGateway};
use wardend::handlers::ModCommand;

struct Space {
    gateway: Arc<RecordingGateway>,
    config: Arc<wardend::Config>,
    _tmp: tempfile::TempDir,
}

async fn provisioned_space() -> Space {
    let tmp = tempfile::tempdir().unwrap();
    let config = fixture_config(&tmp.path().join("hooks.json"));
    let gateway = Arc::new(RecordingGateway::new());
    run_provisioning(&config, &gateway).await;
    Space {
        gateway,
        config,
        _tmp: tmp,
    }
}

async fn drive(space: &Space, events: Vec<Event>) {
    let (event_loop, tx) = EventLoop::new(
        space.config.clone(),
        space.gateway.clone(),
    );
    for event in events {
        tx.send(event).await.unwrap();
    }
    drop(tx);
    event_loop.run().await;
}

async fn role_id(space: &Space, name: &str) -> wardend::gateway::RoleId {
    space
        .gateway
        .list_roles()
        .await
        .unwrap()
        .into_iter()
        .find(|r| r.name == name)
        .unwrap_or_else(|| panic!("role {name} not provisioned"))
        .id
}

#[tokio::test]
async fn join_quarantine_then_release_reaches_verified() {
    let space = provisioned_space().await;
    let member = space.gateway.seed_member("newcomer", Utc::now());

    drive(
        &space,
        vec![
            Event::MemberJoined {
                member,
                account_created: Utc::now(),
            },
            Event::Command {
                issuer: MemberId(999),
                command: ModCommand::Unquarantine { member },
                reply_to: ChannelId(1),
            },
        ],
    )
    .await;

    let quarantine = role_id(&space, "⚠️ Quarantine").await;
    let verified = role_id(&space, "✅ Verified").await;
    let roles = space.gateway.member_roles(member);
    assert!(!roles.contains(&quarantine), "quarantine role must be removed");
    assert!(roles.contains(&verified), "verified role must be added");
}

#[tokio::test]
async fn unquarantine_without_quarantine_reports_and_changes_nothing() {
    let space = provisioned_space().await;
    let member = space
        .gateway
        .seed_member("regular", Utc::now() - Duration::days(100));

    drive(
        &space,
        vec![Event::Command {
            issuer: MemberId(999),
            command: ModCommand::Unquarantine { member },
            reply_to: ChannelId(7),
        }],
    )
    .await;

    assert!(space.gateway.member_roles(member).is_empty());
    // The command still produced an explicit informational reply.
    assert!(space.gateway.calls().iter().any(|c| matches!(
        c,
        RecordedCall::SendNotice { channel, text, .. }
            if *channel == ChannelId(7) && text.contains("not quarantined")
    )));
}

#[tokio::test]
async fn watch_band_join_applies_no_roles() {
    let space = provisioned_space().await;
    let member = space
        .gateway
        .seed_member("few-days-old", Utc::now() - Duration::days(3));
    let before = space.gateway.mutation_count();

    drive(
        &space,
        vec![Event::MemberJoined {
            member,
            account_created: Utc::now() - Duration::days(3),
        }],
    )
    .await;

    assert_eq!(space.gateway.mutation_count(), before);
    assert!(space.gateway.member_roles(member).is_empty());
}

#[tokio::test]
async fn suspicious_link_is_blocked_with_longer_notice() {
    let space = provisioned_space().await;
    let author = space
        .gateway
        .seed_member("linker", Utc::now() - Duration::days(50));

    drive(
        &space,
        vec![Event::MessageCreated {
            message: MessageId(7777),
            channel: ChannelId(3),
            author,
            author_is_bot: false,
            content: "check out bit.ly/xyz".into(),
        }],
    )
    .await;

    let calls = space.gateway.calls();
    assert!(calls.contains(&RecordedCall::DeleteMessage {
        message: MessageId(7777)
    }));
    assert!(calls.iter().any(|c| matches!(
        c,
        RecordedCall::SendNotice { auto_expire_secs: Some(15), .. }
    )));
}

#[tokio::test]
async fn clean_message_has_no_side_effects() {
    let space = provisioned_space().await;
    let author = space
        .gateway
        .seed_member("chatter", Utc::now() - Duration::days(50));
    let before = space.gateway.mutation_count();

    drive(
        &space,
        vec![Event::MessageCreated {
            message: MessageId(1),
            channel: ChannelId(3),
            author,
            author_is_bot: false,
            content: "hello friends".into(),
        }],
    )
    .await;

    assert_eq!(space.gateway.mutation_count(), before);
}

#[tokio::test]
async fn security_status_reflects_quarantine_count() {
    let space = provisioned_space().await;
    let fresh = space.gateway.seed_member("fresh", Utc::now());

    drive(
        &space,
        vec![
            Event::MemberJoined {
                member: fresh,
                account_created: Utc::now(),
            },
            Event::Command {
                issuer: MemberId(999),
                command: ModCommand::SecurityStatus,
                reply_to: ChannelId(5),
            },
        ],
    )
    .await;

    assert!(space.gateway.calls().iter().any(|c| matches!(
        c,
        RecordedCall::SendNotice { channel, text, .. }
            if *channel == ChannelId(5) && text.contains("Quarantined: 1")
    )));
}

#[tokio::test]
async fn lockdown_and_unlock_write_everyone_overrides() {
    let space = provisioned_space().await;

    drive(
        &space,
        vec![
            Event::Command {
                issuer: MemberId(999),
                command: ModCommand::Lockdown {
                    channel: "general".into(),
                },
                reply_to: ChannelId(5),
            },
            Event::Command {
                issuer: MemberId(999),
                command: ModCommand::Unlock {
                    channel: "general".into(),
                },
                reply_to: ChannelId(5),
            },
        ],
    )
    .await;

    use wardend::gateway::{OverrideTarget, PermissionFlags};
    let general = space
        .gateway
        .list_channels()
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.name == "general")
        .unwrap()
        .id;
    let calls = space.gateway.calls();
    assert!(calls.contains(&RecordedCall::SetOverride {
        channel: general,
        target: OverrideTarget::Everyone,
        flags: PermissionFlags::deny_send(),
    }));
    assert!(calls.contains(&RecordedCall::SetOverride {
        channel: general,
        target: OverrideTarget::Everyone,
        flags: PermissionFlags::inherit(),
    }));
}

#[tokio::test]
async fn assign_admin_is_idempotent_with_explicit_reply() {
    let space = provisioned_space().await;
    let member = space
        .gateway
        .seed_member("future-admin", Utc::now() - Duration::days(400));

    let command = |member| Event::Command {
        issuer: MemberId(999),
        command: ModCommand::AssignAdmin { member },
        reply_to: ChannelId(9),
    };
    drive(&space, vec![command(member), command(member)]).await;

    let admin = role_id(&space, "🛡️ Admin").await;
    assert_eq!(space.gateway.member_roles(member), vec![admin]);
    // Second invocation reported the no-op instead of staying silent.
    assert!(space.gateway.calls().iter().any(|c| matches!(
        c,
        RecordedCall::SendNotice { text, .. } if text.contains("already has admin")
    )));
}
