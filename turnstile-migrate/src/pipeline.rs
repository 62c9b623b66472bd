use std::collections::HashMap;

use anyhow::bail;
use futures_util::future;
use tracing::{info, warn};
use uuid::Uuid;

use turnstile_core::model::{Attendee, Event};
use turnstile_core::repository::{AttendeeRepository, EventRepository};

use crate::legacy::{LegacyAttendee, LegacyEvent, LegacySource};

/// Attendees load in fixed-size batches: concurrent within a batch,
/// sequential across batches, so a failure stops the run within one batch.
const ATTENDEE_BATCH_SIZE: usize = 10;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub events: usize,
    pub attendees: usize,
}

/// Runs the whole pipeline: export, transform, load events, load attendees,
/// validate. Any failure aborts the run; nothing is rolled back, so a rerun
/// is only safe against an empty target.
pub async fn run(
    source: &dyn LegacySource,
    events: &dyn EventRepository,
    attendees: &dyn AttendeeRepository,
) -> anyhow::Result<MigrationReport> {
    info!("Exporting events from the legacy store...");
    let legacy_events = source.events().await.map_err(|e| anyhow::anyhow!(e))?;
    info!("Exported {} events", legacy_events.len());

    info!("Exporting attendees from the legacy store...");
    let legacy_attendees = source.attendees().await.map_err(|e| anyhow::anyhow!(e))?;
    info!("Exported {} attendees", legacy_attendees.len());

    if legacy_events.is_empty() && legacy_attendees.is_empty() {
        warn!("No data to migrate");
        return Ok(MigrationReport::default());
    }

    // Events go first: attendee transformation needs the id mapping built
    // here, one entry per inserted event.
    info!("Inserting events into the target store...");
    let mut event_ids: HashMap<String, Uuid> = HashMap::with_capacity(legacy_events.len());
    for legacy in &legacy_events {
        let event = transform_event(legacy);
        events
            .insert(&event)
            .await
            .map_err(|e| anyhow::anyhow!("inserting event {}: {}", legacy.id, e))?;
        event_ids.insert(legacy.id.clone(), event.id);
        info!("Migrated event: {} ({} -> {})", legacy.name, legacy.id, event.id);
    }
    info!("Inserted {} events", legacy_events.len());

    info!("Inserting attendees into the target store...");
    for batch in legacy_attendees.chunks(ATTENDEE_BATCH_SIZE) {
        let transformed = batch
            .iter()
            .map(|legacy| transform_attendee(legacy, &event_ids))
            .collect::<anyhow::Result<Vec<Attendee>>>()?;

        future::try_join_all(
            transformed
                .iter()
                .map(|attendee| attendees.insert(attendee)),
        )
        .await
        .map_err(|e| anyhow::anyhow!("inserting attendee batch: {}", e))?;

        for attendee in &transformed {
            info!("Migrated attendee: {} ({})", attendee.name, attendee.email);
        }
    }
    info!("Inserted {} attendees", legacy_attendees.len());

    validate(&legacy_events, &legacy_attendees, events, attendees).await?;

    Ok(MigrationReport {
        events: legacy_events.len(),
        attendees: legacy_attendees.len(),
    })
}

fn transform_event(legacy: &LegacyEvent) -> Event {
    Event {
        id: Uuid::new_v4(),
        name: legacy.name.clone(),
        date: legacy.date.timestamp_millis(),
        capacity: legacy.capacity,
        created_at: legacy.created_at.timestamp_millis(),
    }
}

fn transform_attendee(
    legacy: &LegacyAttendee,
    event_ids: &HashMap<String, Uuid>,
) -> anyhow::Result<Attendee> {
    let Some(&event_id) = event_ids.get(&legacy.event_id) else {
        bail!(
            "no migrated event for legacy event {} (attendee {})",
            legacy.event_id,
            legacy.id
        );
    };

    Ok(Attendee {
        id: Uuid::new_v4(),
        event_id,
        name: legacy.name.clone(),
        email: legacy.email.clone(),
        scan_token: legacy.qr_code.clone(),
        checked_in: legacy.checked_in,
        checked_in_at: legacy.checked_in_at.map(|at| at.timestamp_millis()),
        created_at: legacy.created_at.timestamp_millis(),
    })
}

/// Count equality on both entity types, plus a spot check that a known
/// event name made it across.
async fn validate(
    legacy_events: &[LegacyEvent],
    legacy_attendees: &[LegacyAttendee],
    events: &dyn EventRepository,
    attendees: &dyn AttendeeRepository,
) -> anyhow::Result<()> {
    info!("Validating migration...");

    let target_events = events.list().await.map_err(|e| anyhow::anyhow!(e))?;
    let target_attendees = attendees.list().await.map_err(|e| anyhow::anyhow!(e))?;

    if target_events.len() != legacy_events.len() {
        bail!(
            "event count mismatch: legacy {}, target {}",
            legacy_events.len(),
            target_events.len()
        );
    }
    if target_attendees.len() != legacy_attendees.len() {
        bail!(
            "attendee count mismatch: legacy {}, target {}",
            legacy_attendees.len(),
            target_attendees.len()
        );
    }

    if let Some(sample) = legacy_events.first() {
        if !target_events.iter().any(|e| e.name == sample.name) {
            bail!("sample event {:?} not found in the target store", sample.name);
        }
    }

    info!("Event count matches: {}", target_events.len());
    info!("Attendee count matches: {}", target_attendees.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use turnstile_core::memory::MemoryStore;

    struct FixtureSource {
        events: Vec<LegacyEvent>,
        attendees: Vec<LegacyAttendee>,
    }

    #[async_trait::async_trait]
    impl LegacySource for FixtureSource {
        async fn events(
            &self,
        ) -> Result<Vec<LegacyEvent>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self.events.clone())
        }

        async fn attendees(
            &self,
        ) -> Result<Vec<LegacyAttendee>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self.attendees.clone())
        }
    }

    fn legacy_event(id: &str, name: &str) -> LegacyEvent {
        LegacyEvent {
            id: id.to_string(),
            name: name.to_string(),
            date: Utc.with_ymd_and_hms(2025, 11, 20, 18, 0, 0).unwrap(),
            capacity: 100,
            created_at: Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0).unwrap(),
        }
    }

    fn legacy_attendee(id: &str, event_id: &str, checked_in: bool) -> LegacyAttendee {
        LegacyAttendee {
            id: id.to_string(),
            name: format!("Guest {}", id),
            email: format!("guest{}@x.com", id),
            event_id: event_id.to_string(),
            qr_code: format!("qr-{}", id),
            checked_in,
            checked_in_at: checked_in
                .then(|| Utc.with_ymd_and_hms(2025, 11, 20, 18, 30, 0).unwrap()),
            created_at: Utc.with_ymd_and_hms(2025, 10, 2, 12, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_round_trip_counts_and_links() {
        let source = FixtureSource {
            events: vec![legacy_event("e1", "Launch Party"), legacy_event("e2", "Demo Night")],
            attendees: (0..25)
                .map(|i| {
                    let event = if i % 2 == 0 { "e1" } else { "e2" };
                    legacy_attendee(&i.to_string(), event, i % 5 == 0)
                })
                .collect(),
        };
        let store = Arc::new(MemoryStore::default());

        let report = run(&source, store.as_ref(), store.as_ref()).await.unwrap();
        assert_eq!(report, MigrationReport { events: 2, attendees: 25 });

        let events = store.events_snapshot();
        let attendees = store.attendees_snapshot();
        assert_eq!(events.len(), 2);
        assert_eq!(attendees.len(), 25);

        // Every migrated attendee points at a migrated event.
        let event_ids: HashSet<_> = events.iter().map(|e| e.id).collect();
        assert!(attendees.iter().all(|a| event_ids.contains(&a.event_id)));

        // Scan tokens carry over from the legacy qr_code column.
        assert!(attendees.iter().any(|a| a.scan_token == "qr-0"));
    }

    #[tokio::test]
    async fn test_transform_converts_timestamps_and_preserves_state() {
        let source = FixtureSource {
            events: vec![legacy_event("e1", "Launch Party")],
            attendees: vec![legacy_attendee("7", "e1", true)],
        };
        let store = Arc::new(MemoryStore::default());

        run(&source, store.as_ref(), store.as_ref()).await.unwrap();

        let event = &store.events_snapshot()[0];
        assert_eq!(
            event.date,
            Utc.with_ymd_and_hms(2025, 11, 20, 18, 0, 0)
                .unwrap()
                .timestamp_millis()
        );

        let attendee = &store.attendees_snapshot()[0];
        assert!(attendee.checked_in);
        assert_eq!(
            attendee.checked_in_at,
            Some(
                Utc.with_ymd_and_hms(2025, 11, 20, 18, 30, 0)
                    .unwrap()
                    .timestamp_millis()
            )
        );
    }

    #[tokio::test]
    async fn test_missing_event_aborts_with_its_id() {
        let source = FixtureSource {
            events: vec![legacy_event("e1", "Launch Party")],
            attendees: vec![
                legacy_attendee("1", "e1", false),
                legacy_attendee("2", "e-orphan", false),
            ],
        };
        let store = Arc::new(MemoryStore::default());

        let err = run(&source, store.as_ref(), store.as_ref())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("e-orphan"));
    }

    #[tokio::test]
    async fn test_empty_source_is_a_noop() {
        let source = FixtureSource {
            events: vec![],
            attendees: vec![],
        };
        let store = Arc::new(MemoryStore::default());

        let report = run(&source, store.as_ref(), store.as_ref()).await.unwrap();
        assert_eq!(report, MigrationReport::default());
        assert!(store.events_snapshot().is_empty());
        assert!(store.attendees_snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_count_mismatch_fails_validation() {
        let source = FixtureSource {
            events: vec![legacy_event("e1", "Launch Party")],
            attendees: vec![legacy_attendee("1", "e1", false)],
        };

        // A target that already holds a row the source does not know about.
        let store = Arc::new(MemoryStore::default());
        let stray = turnstile_core::model::Event {
            id: Uuid::new_v4(),
            name: "Stray".to_string(),
            date: 0,
            capacity: 1,
            created_at: 0,
        };
        EventRepository::insert(store.as_ref(), &stray).await.unwrap();

        let err = run(&source, store.as_ref(), store.as_ref())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("event count mismatch"));
    }
}
