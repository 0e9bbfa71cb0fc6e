use super::encoder::encode_attachment_bytes;
use super::models::{Identity, MessageTemplate, PassReport, SendRequest};
use super::notifications::build_message;
use super::sanitizer::sanitize;
use crate::components::feed::FeedSource;
use crate::components::mailjet::DeliveryGateway;
use crate::config::Config;
use crate::error::RelayResult;
use crate::ical::{self, CalendarDocument, Component};
use futures::future::join_all;
use tracing::{info, warn};

/// Who an invitation is from and to, and how it reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addressing {
    pub sender: Identity,
    pub recipient: Identity,
    pub template: MessageTemplate,
}

impl Addressing {
    pub fn from_config(config: &Config) -> Self {
        Self {
            sender: config.sender.clone(),
            recipient: config.recipient.clone(),
            template: config.template.clone(),
        }
    }
}

/// A send request ready for the gateway, labelled with its source event
#[derive(Debug, Clone)]
pub struct PreparedInvitation {
    pub uid: String,
    pub summary: String,
    pub request: SendRequest,
}

/// Result of preparing every event in a document
#[derive(Debug, Default)]
pub struct Preparation {
    pub events_found: usize,
    pub invitations: Vec<PreparedInvitation>,
    pub failed: usize,
}

/// Sanitize, render, wrap, encode and address a single event
pub fn prepare_invitation(event: &Component, addressing: &Addressing) -> RelayResult<SendRequest> {
    let sanitized = sanitize(event);
    let event_text = ical::render_component(&sanitized)?;
    let envelope = ical::wrap_single_event(&event_text)?;
    let attachment = encode_attachment_bytes(envelope.as_bytes())?;
    Ok(build_message(
        &attachment,
        &addressing.recipient,
        &addressing.sender,
        &addressing.template,
    ))
}

/// Prepare every VEVENT of a document; other components are left alone.
///
/// A failing event is logged and skipped without affecting its siblings.
pub fn prepare_all(document: &CalendarDocument, addressing: &Addressing) -> Preparation {
    let mut preparation = Preparation::default();

    for event in document.events() {
        preparation.events_found += 1;
        let (uid, summary) = event.label();
        match prepare_invitation(event, addressing) {
            Ok(request) => preparation.invitations.push(PreparedInvitation {
                uid,
                summary,
                request,
            }),
            Err(e) => {
                warn!(uid = %uid, summary = %summary, error = %e, "Skipping event");
                preparation.failed += 1;
            }
        }
    }

    preparation
}

/// Fetch, parse, prepare and deliver one feed snapshot.
///
/// Fetch and parse failures abort the pass; per-event and per-delivery
/// failures are counted in the report.
pub async fn run_pass(
    feed: &dyn FeedSource,
    gateway: &dyn DeliveryGateway,
    addressing: &Addressing,
) -> RelayResult<PassReport> {
    let text = feed.fetch().await?;
    let document = ical::parse(&text)?;

    let preparation = prepare_all(&document, addressing);
    info!(
        events = preparation.events_found,
        prepared = preparation.invitations.len(),
        failed = preparation.failed,
        "Prepared invitations"
    );

    let deliveries = join_all(preparation.invitations.iter().map(|invitation| async move {
        (invitation, gateway.deliver(&invitation.request).await)
    }))
    .await;

    let mut report = PassReport {
        events_found: preparation.events_found,
        prepared: preparation.invitations.len(),
        delivered: 0,
        failed: preparation.failed,
    };

    for (invitation, result) in deliveries {
        match result {
            Ok(receipt) => {
                info!(
                    uid = %invitation.uid,
                    summary = %invitation.summary,
                    status = receipt.status,
                    "Invitation delivered"
                );
                report.delivered += 1;
            }
            Err(e) => {
                warn!(
                    uid = %invitation.uid,
                    summary = %invitation.summary,
                    error = %e,
                    "Invitation delivery failed"
                );
                report.failed += 1;
            }
        }
    }

    Ok(report)
}
